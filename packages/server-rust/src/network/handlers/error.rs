//! HTTP mapping of [`FleetError`] outcomes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleet_core::FleetError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::network::faults::{fault_response, FaultReport};

/// Body of every non-2xx response produced by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable code, e.g. `driver_conflict`.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

/// Handler error wrapper so [`FleetError`] can become a response.
#[derive(Debug)]
pub struct ApiError(pub FleetError);

impl From<FleetError> for ApiError {
    fn from(err: FleetError) -> Self {
        Self(err)
    }
}

/// Status code for a fleet outcome.
#[must_use]
pub fn status_for(err: &FleetError) -> StatusCode {
    match err {
        FleetError::NotFound { .. } => StatusCode::NOT_FOUND,
        FleetError::InvalidCategory(_)
        | FleetError::InvalidInput { .. }
        | FleetError::LicenseMismatch { .. }
        | FleetError::DriverConflict { .. }
        | FleetError::TruckConflict { .. } => StatusCode::BAD_REQUEST,
        FleetError::DuplicatePlate { .. } | FleetError::ResourceInUse { .. } => {
            StatusCode::CONFLICT
        }
        FleetError::Fault(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            FleetError::Fault(err) => {
                error!("unhandled fault: {err:#}");
                fault_response(FaultReport::from_error(&err))
            }
            outcome => {
                let status = status_for(&outcome);
                debug!(code = outcome.code(), %status, "request rejected: {outcome}");
                let body = ErrorResponse {
                    error: outcome.code().to_string(),
                    message: outcome.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
