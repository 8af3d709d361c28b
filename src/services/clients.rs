use crate::{
    db::DbPool,
    entities::{client, vehicle, work_order},
    errors::ServiceError,
    services::required_text,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClientInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub tax_number: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicleInput {
    pub client_id: Uuid,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub make: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub engine_code: String,
}

/// Clients and their vehicles, kept only as far as work orders need them
#[derive(Clone)]
pub struct ClientService {
    db_pool: Arc<DbPool>,
}

impl ClientService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input))]
    pub async fn create_client(
        &self,
        input: CreateClientInput,
    ) -> Result<client::Model, ServiceError> {
        input.validate()?;
        let name = required_text("name", &input.name)?;
        let phone = required_text("phone", &input.phone)?;
        let db = self.db_pool.as_ref();

        if client::Entity::find()
            .filter(client::Column::Phone.eq(phone.as_str()))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "a client with phone {} already exists",
                phone
            )));
        }

        let now = Utc::now();
        let created = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            phone: Set(phone),
            email: Set(input.email.trim().to_string()),
            address: Set(input.address),
            company_name: Set(input.company_name),
            tax_number: Set(input.tax_number),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!(client_id = %created.id, "Client created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_client(&self, id: Uuid) -> Result<client::Model, ServiceError> {
        client::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", id))
    }

    /// Refused while vehicles or work orders still point at the client
    #[instrument(skip(self))]
    pub async fn delete_client(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        self.get_client(id).await?;

        let vehicles = vehicle::Entity::find()
            .filter(vehicle::Column::ClientId.eq(id))
            .count(db)
            .await?;
        let work_orders = work_order::Entity::find()
            .filter(work_order::Column::ClientId.eq(id))
            .count(db)
            .await?;
        if vehicles > 0 || work_orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "client {} still has {} vehicle(s) and {} work order(s)",
                id, vehicles, work_orders
            )));
        }

        let result = client::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Client", id));
        }
        info!(client_id = %id, "Client deleted");
        Ok(())
    }

    #[instrument(skip(self, input), fields(client_id = %input.client_id))]
    pub async fn create_vehicle(
        &self,
        input: CreateVehicleInput,
    ) -> Result<vehicle::Model, ServiceError> {
        input.validate()?;
        let make = input.make.trim().to_string();
        let model = input.model.trim().to_string();
        let db = self.db_pool.as_ref();

        self.get_client(input.client_id).await?;

        let created = vehicle::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(input.client_id),
            make: Set(make),
            model: Set(model),
            year: Set(input.year),
            license_plate: Set(input.license_plate.trim().to_string()),
            vin: Set(input.vin.trim().to_string()),
            engine_code: Set(input.engine_code.trim().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;

        info!(vehicle_id = %created.id, "Vehicle created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_vehicle(&self, id: Uuid) -> Result<vehicle::Model, ServiceError> {
        vehicle::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Vehicle", id))
    }
}
