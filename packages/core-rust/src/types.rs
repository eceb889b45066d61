//! Fleet entities and the assignment read model.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::license::LicenseCategory;

/// Maximum stored length of an error message, in characters.
pub const ERROR_MESSAGE_MAX_CHARS: usize = 1024;
/// Maximum stored length of a stack trace, in characters.
pub const STACK_TRACE_MAX_CHARS: usize = 2048;
/// Maximum stored length of an endpoint path, in characters.
pub const ENDPOINT_MAX_CHARS: usize = 255;

/// Generates a fresh opaque identifier (UUID v4, hyphenated).
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Kind of persisted entity, used in not-found and in-use outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Driver,
    Truck,
    Assignment,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driver => "Driver",
            Self::Truck => "Truck",
            Self::Assignment => "Assignment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub license_type: LicenseCategory,
}

/// A truck and the minimum license category needed to drive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Truck {
    pub id: String,
    /// Globally unique licence plate.
    pub plate: String,
    pub min_license_type: LicenseCategory,
}

/// A driver booked on a truck for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub driver_id: String,
    pub truck_id: String,
    pub date: NaiveDate,
}

/// Assignment joined with the current driver and truck fields.
///
/// Composed at read time and never stored, so it always reflects the
/// latest driver name, license and truck plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssignmentDetail {
    pub id: String,
    pub driver_id: String,
    pub driver_name: String,
    pub driver_license_type: LicenseCategory,
    pub truck_id: String,
    pub truck_plate: String,
    pub date: NaiveDate,
}

impl AssignmentDetail {
    /// Joins an assignment with the driver and truck it references.
    #[must_use]
    pub fn compose(assignment: &Assignment, driver: &Driver, truck: &Truck) -> Self {
        Self {
            id: assignment.id.clone(),
            driver_id: driver.id.clone(),
            driver_name: driver.name.clone(),
            driver_license_type: driver.license_type,
            truck_id: truck.id.clone(),
            truck_plate: truck.plate.clone(),
            date: assignment.date,
        }
    }
}

/// Diagnostic record of an unhandled fault. Write-only from the API's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub error_message: String,
    pub stack_trace: String,
    pub endpoint: String,
}

impl ErrorLog {
    /// Creates an entry stamped with the current time.
    ///
    /// Fields longer than the storage limits are truncated on a character
    /// boundary rather than rejected.
    #[must_use]
    pub fn new(
        error_message: impl Into<String>,
        stack_trace: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            timestamp: Utc::now(),
            error_message: truncate_chars(error_message.into(), ERROR_MESSAGE_MAX_CHARS),
            stack_trace: truncate_chars(stack_trace.into(), STACK_TRACE_MAX_CHARS),
            endpoint: truncate_chars(endpoint.into(), ENDPOINT_MAX_CHARS),
        }
    }
}

fn truncate_chars(mut s: String, max: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
    s
}
