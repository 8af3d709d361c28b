use super::common::{created_response, no_content_response, parse_id, success_response};
use crate::{
    errors::ServiceError,
    services::parts::{CreatePartInput, UpdatePartInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::get,
    Router,
};

pub fn parts_routes() -> Router<AppState> {
    Router::new()
        .route("/parts", get(list_parts).post(create_part))
        .route("/parts/:id", get(get_part).put(update_part).delete(delete_part))
}

/// Parts with type and supplier names, ordered by code
pub async fn list_parts(State(state): State<AppState>) -> Result<Response, ServiceError> {
    Ok(success_response(state.services.parts.list_parts().await?))
}

pub async fn create_part(
    State(state): State<AppState>,
    Json(payload): Json<CreatePartInput>,
) -> Result<Response, ServiceError> {
    Ok(created_response(state.services.parts.create_part(payload).await?))
}

pub async fn get_part(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    Ok(success_response(state.services.parts.get_part(parse_id(&id)?).await?))
}

pub async fn update_part(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePartInput>,
) -> Result<Response, ServiceError> {
    let id = parse_id(&id)?;
    Ok(success_response(state.services.parts.update_part(id, payload).await?))
}

/// Deletes the part and its movement history
pub async fn delete_part(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    state.services.parts.delete_part(parse_id(&id)?).await?;
    Ok(no_content_response())
}
