//! `/api/trucks` handlers, including the per-day availability check.

use axum::extract::{Path, Query, State};
use axum::Json;
use fleet_core::{AvailabilityQuery, Truck, TruckInput};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::{ApiError, ErrorResponse};
use super::{AppState, MessageResponse};

/// Result of an availability check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[utoipa::path(
    post,
    path = "/api/trucks",
    tag = "trucks",
    request_body = TruckInput,
    responses(
        (status = 200, description = "Truck registered", body = Truck),
        (status = 400, description = "Invalid plate or license category", body = ErrorResponse),
        (status = 409, description = "Plate already registered", body = ErrorResponse),
    )
)]
pub async fn create_truck(
    State(state): State<AppState>,
    Json(input): Json<TruckInput>,
) -> Result<Json<Truck>, ApiError> {
    Ok(Json(state.services.trucks.create(input).await?))
}

#[utoipa::path(
    get,
    path = "/api/trucks",
    tag = "trucks",
    responses((status = 200, description = "All trucks, by plate", body = [Truck]))
)]
pub async fn list_trucks(State(state): State<AppState>) -> Result<Json<Vec<Truck>>, ApiError> {
    Ok(Json(state.services.trucks.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/trucks/{id}",
    tag = "trucks",
    params(("id" = String, Path, description = "Truck id")),
    responses(
        (status = 200, description = "The truck", body = Truck),
        (status = 404, description = "Truck not found", body = ErrorResponse),
    )
)]
pub async fn get_truck(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Truck>, ApiError> {
    Ok(Json(state.services.trucks.get(&id).await?))
}

#[utoipa::path(
    put,
    path = "/api/trucks/{id}",
    tag = "trucks",
    params(("id" = String, Path, description = "Truck id")),
    request_body = TruckInput,
    responses(
        (status = 200, description = "Truck updated", body = Truck),
        (status = 400, description = "Invalid plate or license category", body = ErrorResponse),
        (status = 404, description = "Truck not found", body = ErrorResponse),
        (status = 409, description = "Plate already registered", body = ErrorResponse),
    )
)]
pub async fn update_truck(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TruckInput>,
) -> Result<Json<Truck>, ApiError> {
    Ok(Json(state.services.trucks.update(&id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/api/trucks/{id}",
    tag = "trucks",
    params(("id" = String, Path, description = "Truck id")),
    responses(
        (status = 200, description = "Truck deleted", body = MessageResponse),
        (status = 404, description = "Truck not found", body = ErrorResponse),
        (status = 409, description = "Truck still has assignments", body = ErrorResponse),
    )
)]
pub async fn delete_truck(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.services.trucks.delete(&id).await?;
    Ok(Json(MessageResponse::new("Truck deleted successfully")))
}

/// Unknown truck ids are reported as available.
#[utoipa::path(
    get,
    path = "/api/trucks/{id}/availability",
    tag = "trucks",
    params(("id" = String, Path, description = "Truck id"), AvailabilityQuery),
    responses((status = 200, description = "Whether the truck is free that day", body = AvailabilityResponse))
)]
pub async fn truck_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let available = state
        .services
        .assignments
        .check_availability(&id, query.date)
        .await?;
    Ok(Json(AvailabilityResponse { available }))
}
