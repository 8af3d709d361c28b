//! Part types and suppliers: the reference data every part points at.

use crate::{
    db::{DbPool, MAX_PAGE_SIZE},
    entities::{part, part_type, supplier},
    errors::ServiceError,
    services::required_text,
};
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Part types the shop works with out of the box
pub const DEFAULT_PART_TYPES: &[&str] = &[
    "Ansamblu central (CHRA)",
    "Geometria",
    "Set garnitura",
    "Nozle Ring Cage",
];

/// Suppliers the shop works with out of the box
pub const DEFAULT_SUPPLIERS: &[&str] = &["Melett", "Vallion", "Cer"];

/// Name payload shared by create and rename
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NameInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Rows inserted by [`CatalogService::seed_reference_data`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub part_types_created: u64,
    pub suppliers_created: u64,
}

#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    // Part types

    #[instrument(skip(self))]
    pub async fn create_part_type(&self, name: &str) -> Result<part_type::Model, ServiceError> {
        let name = required_text("name", name)?;
        let db = self.db_pool.as_ref();

        if part_type::Entity::find()
            .filter(part_type::Column::Name.eq(name.as_str()))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "part type '{}' already exists",
                name
            )));
        }

        let created = part_type::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;
        info!(part_type_id = %created.id, "Part type created");
        Ok(created)
    }

    pub async fn list_part_types(&self) -> Result<Vec<part_type::Model>, ServiceError> {
        Ok(part_type::Entity::find()
            .order_by_asc(part_type::Column::Name)
            .limit(MAX_PAGE_SIZE)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn rename_part_type(
        &self,
        id: Uuid,
        name: &str,
    ) -> Result<part_type::Model, ServiceError> {
        let name = required_text("name", name)?;
        let db = self.db_pool.as_ref();

        let existing = part_type::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Part type", id))?;
        if existing.name == name {
            return Ok(existing);
        }
        if part_type::Entity::find()
            .filter(part_type::Column::Name.eq(name.as_str()))
            .filter(part_type::Column::Id.ne(id))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "part type '{}' already exists",
                name
            )));
        }

        let mut active = existing.into_active_model();
        active.name = Set(name);
        Ok(active.update(db).await?)
    }

    /// Refused while any part still references the type
    #[instrument(skip(self))]
    pub async fn delete_part_type(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let in_use = part::Entity::find()
            .filter(part::Column::PartTypeId.eq(id))
            .count(db)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::Conflict(format!(
                "part type {} is used by {} part(s)",
                id, in_use
            )));
        }

        let result = part_type::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Part type", id));
        }
        Ok(())
    }

    // Suppliers

    #[instrument(skip(self))]
    pub async fn create_supplier(&self, name: &str) -> Result<supplier::Model, ServiceError> {
        let name = required_text("name", name)?;
        let db = self.db_pool.as_ref();

        if supplier::Entity::find()
            .filter(supplier::Column::Name.eq(name.as_str()))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "supplier '{}' already exists",
                name
            )));
        }

        let created = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;
        info!(supplier_id = %created.id, "Supplier created");
        Ok(created)
    }

    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        Ok(supplier::Entity::find()
            .order_by_asc(supplier::Column::Name)
            .limit(MAX_PAGE_SIZE)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn rename_supplier(
        &self,
        id: Uuid,
        name: &str,
    ) -> Result<supplier::Model, ServiceError> {
        let name = required_text("name", name)?;
        let db = self.db_pool.as_ref();

        let existing = supplier::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", id))?;
        if existing.name == name {
            return Ok(existing);
        }
        if supplier::Entity::find()
            .filter(supplier::Column::Name.eq(name.as_str()))
            .filter(supplier::Column::Id.ne(id))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "supplier '{}' already exists",
                name
            )));
        }

        let mut active = existing.into_active_model();
        active.name = Set(name);
        Ok(active.update(db).await?)
    }

    /// Refused while any part still references the supplier
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let in_use = part::Entity::find()
            .filter(part::Column::SupplierId.eq(id))
            .count(db)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::Conflict(format!(
                "supplier {} is used by {} part(s)",
                id, in_use
            )));
        }

        let result = supplier::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Supplier", id));
        }
        Ok(())
    }

    /// Inserts the default part types and suppliers that are missing.
    /// Safe to run repeatedly and concurrently.
    #[instrument(skip(self))]
    pub async fn seed_reference_data(&self) -> Result<SeedReport, ServiceError> {
        let db = self.db_pool.as_ref();
        let mut report = SeedReport::default();

        for name in DEFAULT_PART_TYPES {
            report.part_types_created += part_type::Entity::insert(part_type::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set((*name).to_string()),
                created_at: Set(Utc::now()),
            })
            .on_conflict(
                OnConflict::column(part_type::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        }

        for name in DEFAULT_SUPPLIERS {
            report.suppliers_created += supplier::Entity::insert(supplier::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set((*name).to_string()),
                created_at: Set(Utc::now()),
            })
            .on_conflict(
                OnConflict::column(supplier::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        }

        info!(
            part_types_created = report.part_types_created,
            suppliers_created = report.suppliers_created,
            "Reference data seeded"
        );
        Ok(report)
    }
}
