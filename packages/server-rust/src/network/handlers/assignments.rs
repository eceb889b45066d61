//! `/api/assignments` handlers.

use axum::extract::{Path, State};
use axum::Json;
use fleet_core::{AssignmentDetail, AssignmentInput};

use super::error::{ApiError, ErrorResponse};
use super::{AppState, MessageResponse};

#[utoipa::path(
    post,
    path = "/api/assignments",
    tag = "assignments",
    request_body = AssignmentInput,
    responses(
        (status = 200, description = "Assignment booked", body = AssignmentDetail),
        (status = 400, description = "License mismatch or scheduling conflict", body = ErrorResponse),
        (status = 404, description = "Driver or truck not found", body = ErrorResponse),
    )
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    Json(input): Json<AssignmentInput>,
) -> Result<Json<AssignmentDetail>, ApiError> {
    let detail = state
        .services
        .assignments
        .create(&input.driver_id, &input.truck_id, input.date)
        .await?;
    Ok(Json(detail))
}

#[utoipa::path(
    get,
    path = "/api/assignments",
    tag = "assignments",
    responses((status = 200, description = "All assignments, by date", body = [AssignmentDetail]))
)]
pub async fn list_assignments(
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentDetail>>, ApiError> {
    Ok(Json(state.services.assignments.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    tag = "assignments",
    params(("id" = String, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "The assignment", body = AssignmentDetail),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
    )
)]
pub async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AssignmentDetail>, ApiError> {
    Ok(Json(state.services.assignments.get(&id).await?))
}

#[utoipa::path(
    put,
    path = "/api/assignments/{id}",
    tag = "assignments",
    params(("id" = String, Path, description = "Assignment id")),
    request_body = AssignmentInput,
    responses(
        (status = 200, description = "Assignment replaced", body = AssignmentDetail),
        (status = 400, description = "License mismatch or scheduling conflict", body = ErrorResponse),
        (status = 404, description = "Assignment, driver or truck not found", body = ErrorResponse),
    )
)]
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<AssignmentInput>,
) -> Result<Json<AssignmentDetail>, ApiError> {
    let detail = state
        .services
        .assignments
        .update(&id, &input.driver_id, &input.truck_id, input.date)
        .await?;
    Ok(Json(detail))
}

#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    tag = "assignments",
    params(("id" = String, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment deleted", body = MessageResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
    )
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.services.assignments.delete(&id).await?;
    Ok(Json(MessageResponse::new("Assignment deleted successfully")))
}
