//! HTTP handler definitions for the fleet server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod assignments;
pub mod drivers;
pub mod error;
pub mod health;
pub mod root;
pub mod trucks;

pub use assignments::{
    create_assignment, delete_assignment, get_assignment, list_assignments, update_assignment,
};
pub use drivers::{create_driver, delete_driver, get_driver, list_drivers, update_driver};
pub use error::{ApiError, ErrorResponse};
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use root::root_handler;
pub use trucks::{
    create_truck, delete_truck, get_truck, list_trucks, truck_availability, update_truck,
    AvailabilityResponse,
};

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ShutdownController;
use crate::service::FleetServices;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Driver, truck and assignment services over the shared store.
    pub services: FleetServices,
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

/// `{"message": ...}` body used by the banner and delete confirmations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
