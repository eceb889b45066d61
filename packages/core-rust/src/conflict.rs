//! One-assignment-per-day rules for drivers and trucks.
//!
//! A driver and a truck are independent resources: each may appear in at
//! most one assignment per calendar day. Both rules are checked separately,
//! driver first, so the reported conflict is deterministic when both fail.

use chrono::NaiveDate;

use crate::types::Assignment;

/// Which reference of an assignment a conflict check is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceField {
    Driver,
    Truck,
}

impl ResourceField {
    fn id_of(self, assignment: &Assignment) -> &str {
        match self {
            Self::Driver => &assignment.driver_id,
            Self::Truck => &assignment.truck_id,
        }
    }
}

/// Returns `true` if any assignment other than `exclude` books `resource_id`
/// (as `field`) on `date`.
///
/// `exclude` is the id of the assignment being updated, so that it does not
/// conflict with its own prior state.
#[must_use]
pub fn has_conflict(
    assignments: &[Assignment],
    resource_id: &str,
    field: ResourceField,
    date: NaiveDate,
    exclude: Option<&str>,
) -> bool {
    assignments.iter().any(|a| {
        a.date == date && field.id_of(a) == resource_id && exclude != Some(a.id.as_str())
    })
}

/// Runs the driver check, then the truck check, and reports the first
/// resource that is already booked.
#[must_use]
pub fn first_conflict(
    assignments: &[Assignment],
    driver_id: &str,
    truck_id: &str,
    date: NaiveDate,
    exclude: Option<&str>,
) -> Option<ResourceField> {
    if has_conflict(assignments, driver_id, ResourceField::Driver, date, exclude) {
        Some(ResourceField::Driver)
    } else if has_conflict(assignments, truck_id, ResourceField::Truck, date, exclude) {
        Some(ResourceField::Truck)
    } else {
        None
    }
}
