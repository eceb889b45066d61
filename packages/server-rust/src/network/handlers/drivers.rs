//! `/api/drivers` handlers.

use axum::extract::{Path, State};
use axum::Json;
use fleet_core::{Driver, DriverInput};

use super::error::{ApiError, ErrorResponse};
use super::{AppState, MessageResponse};

#[utoipa::path(
    post,
    path = "/api/drivers",
    tag = "drivers",
    request_body = DriverInput,
    responses(
        (status = 200, description = "Driver registered", body = Driver),
        (status = 400, description = "Invalid name or license category", body = ErrorResponse),
    )
)]
pub async fn create_driver(
    State(state): State<AppState>,
    Json(input): Json<DriverInput>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(state.services.drivers.create(input).await?))
}

#[utoipa::path(
    get,
    path = "/api/drivers",
    tag = "drivers",
    responses((status = 200, description = "All drivers, by name", body = [Driver]))
)]
pub async fn list_drivers(State(state): State<AppState>) -> Result<Json<Vec<Driver>>, ApiError> {
    Ok(Json(state.services.drivers.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/drivers/{id}",
    tag = "drivers",
    params(("id" = String, Path, description = "Driver id")),
    responses(
        (status = 200, description = "The driver", body = Driver),
        (status = 404, description = "Driver not found", body = ErrorResponse),
    )
)]
pub async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(state.services.drivers.get(&id).await?))
}

#[utoipa::path(
    put,
    path = "/api/drivers/{id}",
    tag = "drivers",
    params(("id" = String, Path, description = "Driver id")),
    request_body = DriverInput,
    responses(
        (status = 200, description = "Driver updated", body = Driver),
        (status = 400, description = "Invalid name or license category", body = ErrorResponse),
        (status = 404, description = "Driver not found", body = ErrorResponse),
    )
)]
pub async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<DriverInput>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(state.services.drivers.update(&id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/api/drivers/{id}",
    tag = "drivers",
    params(("id" = String, Path, description = "Driver id")),
    responses(
        (status = 200, description = "Driver deleted", body = MessageResponse),
        (status = 404, description = "Driver not found", body = ErrorResponse),
        (status = 409, description = "Driver still has assignments", body = ErrorResponse),
    )
)]
pub async fn delete_driver(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.services.drivers.delete(&id).await?;
    Ok(Json(MessageResponse::new("Driver deleted successfully")))
}
