use super::common::{created_response, parse_id, success_response};
use crate::{entities::stock_movement::MovementType, errors::ServiceError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    pub part_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
}

pub fn stock_movement_routes() -> Router<AppState> {
    Router::new()
        .route("/stock-movements", post(record_movement))
        .route("/stock-movements/:part_id", get(list_movements))
}

/// Records an IN or OUT movement; 422 when an OUT exceeds the balance
pub async fn record_movement(
    State(state): State<AppState>,
    Json(payload): Json<RecordMovementRequest>,
) -> Result<Response, ServiceError> {
    let movement = state
        .services
        .stock_ledger
        .record_movement(payload.part_id, payload.movement_type, payload.quantity)
        .await?;
    Ok(created_response(movement))
}

pub async fn list_movements(
    State(state): State<AppState>,
    Path(part_id): Path<String>,
) -> Result<Response, ServiceError> {
    let movements = state
        .services
        .stock_ledger
        .list_movements(parse_id(&part_id)?)
        .await?;
    Ok(success_response(movements))
}
