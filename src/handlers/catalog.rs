use super::common::{
    created_response, no_content_response, parse_id, success_response, validate_input,
};
use crate::{errors::ServiceError, services::catalog::NameInput, AppState};
use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{post, put},
    Router,
};

/// Part type, supplier and seeding routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/part-types", post(create_part_type).get(list_part_types))
        .route("/part-types/:id", put(rename_part_type).delete(delete_part_type))
        .route("/suppliers", post(create_supplier).get(list_suppliers))
        .route("/suppliers/:id", put(rename_supplier).delete(delete_supplier))
        .route("/reference-data/seed", post(seed_reference_data))
}

pub async fn create_part_type(
    State(state): State<AppState>,
    Json(payload): Json<NameInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let created = state.services.catalog.create_part_type(&payload.name).await?;
    Ok(created_response(created))
}

pub async fn list_part_types(State(state): State<AppState>) -> Result<Response, ServiceError> {
    Ok(success_response(state.services.catalog.list_part_types().await?))
}

pub async fn rename_part_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NameInput>,
) -> Result<Response, ServiceError> {
    let id = parse_id(&id)?;
    validate_input(&payload)?;
    let renamed = state.services.catalog.rename_part_type(id, &payload.name).await?;
    Ok(success_response(renamed))
}

pub async fn delete_part_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    state.services.catalog.delete_part_type(parse_id(&id)?).await?;
    Ok(no_content_response())
}

pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<NameInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let created = state.services.catalog.create_supplier(&payload.name).await?;
    Ok(created_response(created))
}

pub async fn list_suppliers(State(state): State<AppState>) -> Result<Response, ServiceError> {
    Ok(success_response(state.services.catalog.list_suppliers().await?))
}

pub async fn rename_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NameInput>,
) -> Result<Response, ServiceError> {
    let id = parse_id(&id)?;
    validate_input(&payload)?;
    let renamed = state.services.catalog.rename_supplier(id, &payload.name).await?;
    Ok(success_response(renamed))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    state.services.catalog.delete_supplier(parse_id(&id)?).await?;
    Ok(no_content_response())
}

pub async fn seed_reference_data(State(state): State<AppState>) -> Result<Response, ServiceError> {
    Ok(success_response(state.services.catalog.seed_reference_data().await?))
}
