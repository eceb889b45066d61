//! Outcome taxonomy for fleet operations.
//!
//! Every variant except [`FleetError::Fault`] is an expected business
//! outcome and is reported to the caller as-is. `Fault` covers anything
//! unexpected (store failures, broken invariants) and must never leak its
//! details to the caller.

use chrono::NaiveDate;

use crate::conflict::ResourceField;
use crate::license::{InvalidCategory, LicenseCategory};
use crate::types::EntityKind;

/// Result alias used across the fleet services.
pub type FleetResult<T> = Result<T, FleetError>;

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("{entity} not found")]
    NotFound { entity: EntityKind },

    #[error(transparent)]
    InvalidCategory(#[from] InvalidCategory),

    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("A truck with this plate already exists")]
    DuplicatePlate { plate: String },

    #[error("Driver does not have the required license type")]
    LicenseMismatch {
        driver: LicenseCategory,
        required: LicenseCategory,
    },

    #[error("Driver is already assigned to another truck on this date")]
    DriverConflict { driver_id: String, date: NaiveDate },

    #[error("Truck is already assigned to another driver on this date")]
    TruckConflict { truck_id: String, date: NaiveDate },

    #[error("{entity} is still referenced by existing assignments")]
    ResourceInUse { entity: EntityKind },

    #[error("internal fault: {0}")]
    Fault(#[from] anyhow::Error),
}

impl FleetError {
    #[must_use]
    pub fn not_found(entity: EntityKind) -> Self {
        Self::NotFound { entity }
    }

    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Builds the conflict outcome for the resource that is already booked.
    #[must_use]
    pub fn conflict(field: ResourceField, resource_id: &str, date: NaiveDate) -> Self {
        match field {
            ResourceField::Driver => Self::DriverConflict {
                driver_id: resource_id.to_string(),
                date,
            },
            ResourceField::Truck => Self::TruckConflict {
                truck_id: resource_id.to_string(),
                date,
            },
        }
    }

    /// Returns `true` for unexpected failures that should be recorded.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    /// Stable machine-readable code for the outcome.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidCategory(_) => "invalid_category",
            Self::InvalidInput { .. } => "invalid_input",
            Self::DuplicatePlate { .. } => "duplicate_plate",
            Self::LicenseMismatch { .. } => "license_mismatch",
            Self::DriverConflict { .. } => "driver_conflict",
            Self::TruckConflict { .. } => "truck_conflict",
            Self::ResourceInUse { .. } => "resource_in_use",
            Self::Fault(_) => "internal_error",
        }
    }
}
