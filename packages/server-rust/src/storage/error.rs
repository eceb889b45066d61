//! Store-level error types and named constraints.

use std::fmt;

use fleet_core::{EntityKind, FleetError};

/// A named integrity constraint enforced by the store.
///
/// Names match the constraint names of the relational schema so that
/// database errors can be mapped back with [`Constraint::from_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    DriverPrimaryKey,
    TruckPrimaryKey,
    AssignmentPrimaryKey,
    TruckPlate,
    AssignmentDriverDate,
    AssignmentTruckDate,
    AssignmentDriver,
    AssignmentTruck,
}

impl Constraint {
    const ALL: [Constraint; 8] = [
        Self::DriverPrimaryKey,
        Self::TruckPrimaryKey,
        Self::AssignmentPrimaryKey,
        Self::TruckPlate,
        Self::AssignmentDriverDate,
        Self::AssignmentTruckDate,
        Self::AssignmentDriver,
        Self::AssignmentTruck,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DriverPrimaryKey => "drivers_pkey",
            Self::TruckPrimaryKey => "trucks_pkey",
            Self::AssignmentPrimaryKey => "assignments_pkey",
            Self::TruckPlate => "trucks_plate_key",
            Self::AssignmentDriverDate => "assignments_driver_id_date_key",
            Self::AssignmentTruckDate => "assignments_truck_id_date_key",
            Self::AssignmentDriver => "assignments_driver_id_fkey",
            Self::AssignmentTruck => "assignments_truck_id_fkey",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors returned by [`FleetStore`](crate::traits::FleetStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(Constraint),
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(Constraint),
    #[error("store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Constraint violations that a service did not map to a business outcome
/// are broken invariants, so everything falls through to a fault here.
/// Services translate the violations they expect before using `?`.
impl From<StoreError> for FleetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Backend(e) => FleetError::Fault(e),
            other => FleetError::Fault(anyhow::Error::new(other)),
        }
    }
}

/// Maps a restrict-on-delete violation to the in-use outcome for `entity`.
pub(crate) fn in_use_or_fault(err: StoreError, entity: EntityKind) -> FleetError {
    match err {
        StoreError::ForeignKeyViolation(_) => FleetError::ResourceInUse { entity },
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_names_round_trip() {
        for c in Constraint::ALL {
            assert_eq!(Constraint::from_name(c.name()), Some(c));
        }
        assert_eq!(Constraint::from_name("unknown_key"), None);
    }

    #[test]
    fn backend_error_becomes_fault() {
        let err: FleetError = StoreError::Backend(anyhow::anyhow!("connection reset")).into();
        assert!(err.is_fault());
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn unexpected_violation_becomes_fault() {
        let err: FleetError = StoreError::UniqueViolation(Constraint::DriverPrimaryKey).into();
        assert!(err.is_fault());
    }

    #[test]
    fn restrict_violation_maps_to_in_use() {
        let err = in_use_or_fault(
            StoreError::ForeignKeyViolation(Constraint::AssignmentTruck),
            EntityKind::Truck,
        );
        assert!(matches!(
            err,
            FleetError::ResourceInUse {
                entity: EntityKind::Truck
            }
        ));
    }
}
