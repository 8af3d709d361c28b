use crate::{
    db::{DbPool, MAX_PAGE_SIZE},
    entities::{
        client, vehicle,
        work_order::{self, ProcessLine, ProcessLines, WorkOrderStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{required_text, work_number::WorkNumberSequencer},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Input for opening a new work order
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkOrderInput {
    pub client_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub turbo_code: String,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateWorkOrderInput {
    #[validate(length(min = 1, max = 100))]
    pub turbo_code: Option<String>,
    pub parts: Option<Vec<ProcessLine>>,
    pub status_passed: Option<bool>,
    pub status_refused: Option<bool>,
    pub cleaning_price: Option<Decimal>,
    pub reconditioning_price: Option<Decimal>,
    pub turbo_price: Option<Decimal>,
    pub status: Option<WorkOrderStatus>,
    pub quote_sent: Option<bool>,
    pub quote_accepted: Option<bool>,
    pub estimated_completion: Option<NaiveDate>,
    pub finalized: Option<bool>,
    pub client_notified: Option<bool>,
}

/// Optional exact-match filters for the list view
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkOrderFilter {
    pub status: Option<WorkOrderStatus>,
    pub client_id: Option<Uuid>,
}

/// List row joining a work order with its client and vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderWithDetails {
    pub id: Uuid,
    pub work_number: String,
    pub client_name: String,
    pub client_phone: String,
    pub vehicle_info: String,
    pub turbo_code: String,
    pub received_date: NaiveDate,
    pub status: WorkOrderStatus,
    pub total_amount: Decimal,
    pub estimated_completion: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Prices must be non-negative and fit the price column
fn valid_price(field: &str, value: Option<Decimal>) -> Result<Option<Decimal>, ServiceError> {
    match value {
        Some(v) if v.is_sign_negative() && !v.is_zero() => Err(ServiceError::ValidationError(
            format!("{} must not be negative", field),
        )),
        Some(v) if v > work_order::max_price() => Err(ServiceError::ValidationError(format!(
            "{} must not exceed {}",
            field,
            work_order::max_price()
        ))),
        other => Ok(other),
    }
}

/// Service for managing work orders
#[derive(Clone)]
pub struct WorkOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    sequencer: WorkNumberSequencer,
}

impl WorkOrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        sequencer: WorkNumberSequencer,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            sequencer,
        }
    }

    /// Preview of the next work number
    pub async fn next_work_number(&self) -> Result<String, ServiceError> {
        self.sequencer.next_work_number().await
    }

    /// Opens a work order for an existing client, numbered by the sequencer
    #[instrument(skip(self, input), fields(client_id = %input.client_id))]
    pub async fn create_work_order(
        &self,
        input: CreateWorkOrderInput,
    ) -> Result<work_order::Model, ServiceError> {
        input.validate()?;
        let turbo_code = required_text("turbo_code", &input.turbo_code)?;
        let db = self.db_pool.as_ref();

        client::Entity::find_by_id(input.client_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", input.client_id))?;

        if let Some(vehicle_id) = input.vehicle_id {
            let vehicle = vehicle::Entity::find_by_id(vehicle_id)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Vehicle", vehicle_id))?;
            if vehicle.client_id != input.client_id {
                return Err(ServiceError::InvalidInput(format!(
                    "vehicle {} does not belong to client {}",
                    vehicle_id, input.client_id
                )));
            }
        }

        let now = Utc::now();
        let template = work_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(input.client_id),
            vehicle_id: Set(input.vehicle_id),
            turbo_code: Set(turbo_code),
            received_date: Set(now.date_naive()),
            parts: Set(ProcessLines::default()),
            status_passed: Set(false),
            status_refused: Set(false),
            cleaning_price: Set(Decimal::ZERO),
            reconditioning_price: Set(Decimal::ZERO),
            turbo_price: Set(Decimal::ZERO),
            status: Set(WorkOrderStatus::Received),
            quote_sent: Set(false),
            quote_accepted: Set(false),
            estimated_completion: Set(None),
            finalized: Set(false),
            client_notified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let order = self.sequencer.allocate_and_insert(template).await?;

        info!(work_order_id = %order.id, work_number = %order.work_number, "Work order created");
        self.event_sender
            .publish(Event::WorkOrderCreated {
                work_order_id: order.id,
                work_number: order.work_number.clone(),
            })
            .await;

        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn get_work_order(&self, id: Uuid) -> Result<work_order::Model, ServiceError> {
        work_order::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Work order", id))
    }

    /// Applies the present fields. Any status may be set at any time; the
    /// work number is never touched.
    #[instrument(skip(self, input))]
    pub async fn update_work_order(
        &self,
        id: Uuid,
        input: UpdateWorkOrderInput,
    ) -> Result<work_order::Model, ServiceError> {
        input.validate()?;
        let cleaning_price = valid_price("cleaning_price", input.cleaning_price)?;
        let reconditioning_price =
            valid_price("reconditioning_price", input.reconditioning_price)?;
        let turbo_price = valid_price("turbo_price", input.turbo_price)?;

        let db = self.db_pool.as_ref();
        let existing = self.get_work_order(id).await?;
        let mut active = existing.into_active_model();

        if let Some(turbo_code) = input.turbo_code {
            active.turbo_code = Set(required_text("turbo_code", &turbo_code)?);
        }
        if let Some(parts) = input.parts {
            active.parts = Set(ProcessLines(parts));
        }
        if let Some(v) = input.status_passed {
            active.status_passed = Set(v);
        }
        if let Some(v) = input.status_refused {
            active.status_refused = Set(v);
        }
        if let Some(v) = cleaning_price {
            active.cleaning_price = Set(v);
        }
        if let Some(v) = reconditioning_price {
            active.reconditioning_price = Set(v);
        }
        if let Some(v) = turbo_price {
            active.turbo_price = Set(v);
        }
        if let Some(v) = input.status {
            active.status = Set(v);
        }
        if let Some(v) = input.quote_sent {
            active.quote_sent = Set(v);
        }
        if let Some(v) = input.quote_accepted {
            active.quote_accepted = Set(v);
        }
        if let Some(v) = input.estimated_completion {
            active.estimated_completion = Set(Some(v));
        }
        if let Some(v) = input.finalized {
            active.finalized = Set(v);
        }
        if let Some(v) = input.client_notified {
            active.client_notified = Set(v);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;

        self.event_sender
            .publish(Event::WorkOrderUpdated {
                work_order_id: updated.id,
                status: updated.status,
            })
            .await;

        Ok(updated)
    }

    /// Removes the order. Its number stays retired.
    #[instrument(skip(self))]
    pub async fn delete_work_order(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_work_order(id).await?;

        let result = work_order::Entity::delete_by_id(id)
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Work order", id));
        }

        info!(work_number = %existing.work_number, "Work order deleted");
        self.event_sender
            .publish(Event::WorkOrderDeleted {
                work_order_id: id,
                work_number: existing.work_number,
            })
            .await;

        Ok(())
    }

    /// Work orders joined with client and vehicle data, newest first
    #[instrument(skip(self))]
    pub async fn list_work_orders(
        &self,
        filter: WorkOrderFilter,
    ) -> Result<Vec<WorkOrderWithDetails>, ServiceError> {
        let db = self.db_pool.as_ref();

        let mut query = work_order::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(work_order::Column::Status.eq(status));
        }
        if let Some(client_id) = filter.client_id {
            query = query.filter(work_order::Column::ClientId.eq(client_id));
        }
        let orders = query
            .order_by_desc(work_order::Column::CreatedAt)
            .order_by_desc(work_order::Column::Id)
            .limit(MAX_PAGE_SIZE)
            .all(db)
            .await?;

        let mut client_ids: Vec<Uuid> = orders.iter().map(|o| o.client_id).collect();
        client_ids.sort_unstable();
        client_ids.dedup();
        let mut vehicle_ids: Vec<Uuid> = orders.iter().filter_map(|o| o.vehicle_id).collect();
        vehicle_ids.sort_unstable();
        vehicle_ids.dedup();

        let clients: HashMap<Uuid, client::Model> = if client_ids.is_empty() {
            HashMap::new()
        } else {
            client::Entity::find()
                .filter(client::Column::Id.is_in(client_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };
        let vehicles: HashMap<Uuid, vehicle::Model> = if vehicle_ids.is_empty() {
            HashMap::new()
        } else {
            vehicle::Entity::find()
                .filter(vehicle::Column::Id.is_in(vehicle_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|v| (v.id, v))
                .collect()
        };

        Ok(orders
            .into_iter()
            .map(|order| {
                let (client_name, client_phone) = clients
                    .get(&order.client_id)
                    .map(|c| (c.name.clone(), c.phone.clone()))
                    .unwrap_or_default();
                let vehicle_info = order
                    .vehicle_id
                    .and_then(|id| vehicles.get(&id))
                    .map(vehicle::Model::display_name)
                    .unwrap_or_default();

                WorkOrderWithDetails {
                    id: order.id,
                    total_amount: order.total_amount(),
                    work_number: order.work_number,
                    client_name,
                    client_phone,
                    vehicle_info,
                    turbo_code: order.turbo_code,
                    received_date: order.received_date,
                    status: order.status,
                    estimated_completion: order.estimated_completion,
                    created_at: order.created_at,
                }
            })
            .collect())
    }
}
