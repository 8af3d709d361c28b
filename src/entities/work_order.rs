use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Work order lifecycle states. Any state may be set at any time.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderStatus {
    #[default]
    #[sea_orm(string_value = "RECEIVED")]
    Received,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "QUOTED")]
    Quoted,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "WORKING")]
    Working,
    #[sea_orm(string_value = "READY")]
    Ready,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
}

/// One process or part line selected on a work order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessLine {
    pub process_id: String,
    pub process_name: String,
    pub category: String,
    /// Estimate in minutes
    #[serde(default)]
    pub estimated_time: i32,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub notes: String,
}

/// JSON column holding the selected process lines
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct ProcessLines(pub Vec<ProcessLine>);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Human-facing number, assigned once at creation
    #[sea_orm(unique)]
    pub work_number: String,
    pub client_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub turbo_code: String,
    pub received_date: NaiveDate,
    #[sea_orm(column_type = "Json")]
    pub parts: ProcessLines,
    pub status_passed: bool,
    pub status_refused: bool,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub cleaning_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub reconditioning_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub turbo_price: Decimal,
    pub status: WorkOrderStatus,
    pub quote_sent: bool,
    pub quote_accepted: bool,
    pub estimated_completion: Option<NaiveDate>,
    pub finalized: bool,
    pub client_notified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Largest price a `NUMERIC(12, 2)` column holds
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

impl Model {
    /// Cleaning + reconditioning + turbo price, `None` on overflow
    pub fn checked_total(&self) -> Option<Decimal> {
        self.cleaning_price
            .checked_add(self.reconditioning_price)?
            .checked_add(self.turbo_price)
    }

    /// Cleaning + reconditioning + turbo price. Saturates instead of
    /// panicking on rows written outside the service.
    pub fn total_amount(&self) -> Decimal {
        self.checked_total().unwrap_or(Decimal::MAX)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_in_screaming_snake_case() {
        let json = serde_json::to_string(&WorkOrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        assert_eq!(WorkOrderStatus::default(), WorkOrderStatus::Received);
        assert_eq!(WorkOrderStatus::Delivered.to_string(), "DELIVERED");
    }

    fn priced(cleaning: Decimal, reconditioning: Decimal, turbo: Decimal) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            work_number: "40000".into(),
            client_id: Uuid::new_v4(),
            vehicle_id: None,
            turbo_code: "GT1749V".into(),
            received_date: now.date_naive(),
            parts: ProcessLines::default(),
            status_passed: false,
            status_refused: false,
            cleaning_price: cleaning,
            reconditioning_price: reconditioning,
            turbo_price: turbo,
            status: WorkOrderStatus::Received,
            quote_sent: false,
            quote_accepted: false,
            estimated_completion: None,
            finalized: false,
            client_notified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn total_adds_the_three_prices() {
        let order = priced(Decimal::new(3000, 2), Decimal::ZERO, Decimal::new(12050, 2));
        assert_eq!(order.checked_total(), Some(Decimal::new(15050, 2)));
        assert_eq!(order.total_amount(), Decimal::new(15050, 2));
    }

    #[test]
    fn total_of_huge_prices_saturates_instead_of_panicking() {
        let huge = Decimal::from(5u64 * 10u64.pow(18)) * Decimal::from(10u64.pow(10));
        let order = priced(huge, Decimal::ZERO, huge);
        assert_eq!(order.checked_total(), None);
        assert_eq!(order.total_amount(), Decimal::MAX);
    }

    #[test]
    fn max_price_fits_the_column() {
        assert_eq!(max_price().to_string(), "9999999999.99");
    }

    #[test]
    fn process_lines_accept_missing_optional_fields() {
        let lines: ProcessLines = serde_json::from_str(
            r#"[{"process_id":"p1","process_name":"Curatare","category":"Cleaning"}]"#,
        )
        .unwrap();
        assert_eq!(lines.0.len(), 1);
        assert!(!lines.0[0].selected);
        assert_eq!(lines.0[0].price, Decimal::ZERO);
    }
}
