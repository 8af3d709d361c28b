use super::common::{created_response, no_content_response, parse_id, success_response};
use crate::{
    errors::ServiceError,
    services::work_orders::{CreateWorkOrderInput, UpdateWorkOrderInput, WorkOrderFilter},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct NextWorkNumber {
    pub work_number: String,
}

pub fn work_order_routes() -> Router<AppState> {
    Router::new()
        .route("/work-orders", get(list_work_orders).post(create_work_order))
        .route("/work-orders/next-number", get(next_work_number))
        .route(
            "/work-orders/:id",
            get(get_work_order)
                .put(update_work_order)
                .delete(delete_work_order),
        )
}

/// Newest first, optionally filtered by `status` and `client_id`
pub async fn list_work_orders(
    State(state): State<AppState>,
    Query(filter): Query<WorkOrderFilter>,
) -> Result<Response, ServiceError> {
    Ok(success_response(
        state.services.work_orders.list_work_orders(filter).await?,
    ))
}

pub async fn create_work_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkOrderInput>,
) -> Result<Response, ServiceError> {
    Ok(created_response(
        state.services.work_orders.create_work_order(payload).await?,
    ))
}

/// Preview only; the number is not reserved
pub async fn next_work_number(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let work_number = state.services.work_orders.next_work_number().await?;
    Ok(success_response(NextWorkNumber { work_number }))
}

pub async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    Ok(success_response(
        state.services.work_orders.get_work_order(parse_id(&id)?).await?,
    ))
}

pub async fn update_work_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateWorkOrderInput>,
) -> Result<Response, ServiceError> {
    let id = parse_id(&id)?;
    Ok(success_response(
        state.services.work_orders.update_work_order(id, payload).await?,
    ))
}

pub async fn delete_work_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    state
        .services
        .work_orders
        .delete_work_order(parse_id(&id)?)
        .await?;
    Ok(no_content_response())
}
