use crate::{
    db::{in_transaction, DbPool, MAX_PAGE_SIZE},
    entities::{part, part_type, stock_movement, supplier},
    errors::ServiceError,
    events::{Event, EventSender},
    services::required_text,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePartInput {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub part_type_id: Uuid,
    pub supplier_id: Uuid,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
}

/// Partial part update. Stock is deliberately absent: it only moves through
/// the ledger.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePartInput {
    #[validate(length(min = 1, max = 64))]
    pub code: Option<String>,
    pub part_type_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Part joined with its type and supplier names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartWithDetails {
    pub id: Uuid,
    pub code: String,
    pub part_type_id: Uuid,
    pub part_type_name: String,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub notes: String,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

async fn ensure_references<C: ConnectionTrait>(
    conn: &C,
    part_type_id: Uuid,
    supplier_id: Uuid,
) -> Result<(), ServiceError> {
    part_type::Entity::find_by_id(part_type_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Part type", part_type_id))?;
    supplier::Entity::find_by_id(supplier_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id))?;
    Ok(())
}

async fn ensure_code_free<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut query = part::Entity::find().filter(part::Column::Code.eq(code));
    if let Some(id) = except {
        query = query.filter(part::Column::Id.ne(id));
    }
    if query.one(conn).await?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "part code '{}' already exists",
            code
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PartService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PartService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a part with zero stock
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create_part(&self, input: CreatePartInput) -> Result<part::Model, ServiceError> {
        input.validate()?;
        let code = required_text("code", &input.code)?;
        let db = self.db_pool.as_ref();

        ensure_references(db, input.part_type_id, input.supplier_id).await?;
        ensure_code_free(db, &code, None).await?;

        let now = Utc::now();
        // The unique index on code still decides a race between two creators
        let created = part::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            part_type_id: Set(input.part_type_id),
            supplier_id: Set(input.supplier_id),
            notes: Set(input.notes),
            stock_quantity: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!(part_id = %created.id, "Part created");
        self.event_sender.publish(Event::PartCreated(created.id)).await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_part(&self, id: Uuid) -> Result<part::Model, ServiceError> {
        part::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Part", id))
    }

    /// Updates descriptive fields. `updated_at` only moves when a value
    /// actually changed.
    #[instrument(skip(self, input))]
    pub async fn update_part(
        &self,
        id: Uuid,
        input: UpdatePartInput,
    ) -> Result<part::Model, ServiceError> {
        input.validate()?;
        let db = self.db_pool.as_ref();
        let existing = self.get_part(id).await?;

        let code = match input.code {
            Some(code) => Some(required_text("code", &code)?),
            None => None,
        };
        let part_type_id = input.part_type_id.unwrap_or(existing.part_type_id);
        let supplier_id = input.supplier_id.unwrap_or(existing.supplier_id);
        ensure_references(db, part_type_id, supplier_id).await?;
        if let Some(code) = code.as_deref() {
            ensure_code_free(db, code, Some(id)).await?;
        }

        let mut active = existing.clone().into_active_model();
        let mut changed = false;
        if let Some(code) = code.filter(|c| *c != existing.code) {
            active.code = Set(code);
            changed = true;
        }
        if part_type_id != existing.part_type_id {
            active.part_type_id = Set(part_type_id);
            changed = true;
        }
        if supplier_id != existing.supplier_id {
            active.supplier_id = Set(supplier_id);
            changed = true;
        }
        if let Some(notes) = input.notes.filter(|n| *n != existing.notes) {
            active.notes = Set(notes);
            changed = true;
        }

        if !changed {
            return Ok(existing);
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    /// Deletes the part together with its movement history
    #[instrument(skip(self))]
    pub async fn delete_part(&self, id: Uuid) -> Result<(), ServiceError> {
        let movements_removed = in_transaction(self.db_pool.as_ref(), move |txn| {
            Box::pin(async move {
                let movements = stock_movement::Entity::delete_many()
                    .filter(stock_movement::Column::PartId.eq(id))
                    .exec(txn)
                    .await?;
                let deleted = part::Entity::delete_by_id(id).exec(txn).await?;
                if deleted.rows_affected == 0 {
                    return Err(ServiceError::not_found("Part", id));
                }
                Ok(movements.rows_affected)
            })
        })
        .await?;

        info!(movements_removed, "Part deleted");
        self.event_sender
            .publish(Event::PartDeleted {
                part_id: id,
                movements_removed,
            })
            .await;
        Ok(())
    }

    /// Parts with type and supplier names, ordered by code
    #[instrument(skip(self))]
    pub async fn list_parts(&self) -> Result<Vec<PartWithDetails>, ServiceError> {
        let db = self.db_pool.as_ref();

        let parts = part::Entity::find()
            .order_by_asc(part::Column::Code)
            .limit(MAX_PAGE_SIZE)
            .all(db)
            .await?;

        let part_types: HashMap<Uuid, String> = part_type::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        let suppliers: HashMap<Uuid, String> = supplier::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(parts
            .into_iter()
            .map(|p| PartWithDetails {
                part_type_name: part_types.get(&p.part_type_id).cloned().unwrap_or_default(),
                supplier_name: suppliers.get(&p.supplier_id).cloned().unwrap_or_default(),
                id: p.id,
                code: p.code,
                part_type_id: p.part_type_id,
                supplier_id: p.supplier_id,
                notes: p.notes,
                stock_quantity: p.stock_quantity,
                created_at: p.created_at,
                updated_at: p.updated_at,
            })
            .collect())
    }
}
