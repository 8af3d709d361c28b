use super::common::{created_response, no_content_response, parse_id, success_response};
use crate::{
    errors::ServiceError,
    services::clients::{CreateClientInput, CreateVehicleInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{get, post},
    Router,
};

pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/clients", post(create_client))
        .route("/clients/:id", get(get_client).delete(delete_client))
        .route("/vehicles", post(create_vehicle))
        .route("/vehicles/:id", get(get_vehicle))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClientInput>,
) -> Result<Response, ServiceError> {
    Ok(created_response(state.services.clients.create_client(payload).await?))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    Ok(success_response(state.services.clients.get_client(parse_id(&id)?).await?))
}

/// 409 while the client still has vehicles or work orders
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    state.services.clients.delete_client(parse_id(&id)?).await?;
    Ok(no_content_response())
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<CreateVehicleInput>,
) -> Result<Response, ServiceError> {
    Ok(created_response(state.services.clients.create_vehicle(payload).await?))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    Ok(success_response(state.services.clients.get_vehicle(parse_id(&id)?).await?))
}
