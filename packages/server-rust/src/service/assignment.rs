//! Assignment scheduling: validation, mutation and the joined read model.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::NaiveDate;
use fleet_core::{
    first_conflict, new_id, Assignment, AssignmentDetail, Driver, EntityKind, FleetError,
    FleetResult, ResourceField, Truck,
};
use tracing::{debug, info, warn};

use crate::storage::{Constraint, StoreError};
use crate::traits::FleetStore;

/// Single authority for creating, changing and removing assignments.
///
/// Every write runs the same checks in a fixed order: driver exists, truck
/// exists, license suffices, driver free, truck free. The store's unique
/// constraints back the last two up when concurrent requests race.
pub struct AssignmentService {
    store: Arc<dyn FleetStore>,
}

impl AssignmentService {
    #[must_use]
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Books `driver_id` on `truck_id` for `date`.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing driver or truck, `LicenseMismatch`,
    /// `DriverConflict` or `TruckConflict` when a rule is violated, `Fault`
    /// on store failure.
    pub async fn create(
        &self,
        driver_id: &str,
        truck_id: &str,
        date: NaiveDate,
    ) -> FleetResult<AssignmentDetail> {
        let (driver, truck) = self
            .validate(driver_id, truck_id, date, None)
            .await
            .inspect_err(|e| debug!(%driver_id, %truck_id, %date, "assignment rejected: {e}"))?;

        let assignment = Assignment {
            id: new_id(),
            driver_id: driver.id.clone(),
            truck_id: truck.id.clone(),
            date,
        };
        self.store
            .insert_assignment(&assignment)
            .await
            .map_err(|e| write_error(e, &assignment))?;

        info!(id = %assignment.id, %driver_id, %truck_id, %date, "assignment created");
        Ok(AssignmentDetail::compose(&assignment, &driver, &truck))
    }

    /// Replaces driver, truck and date of assignment `id`.
    ///
    /// The assignment's own prior booking never conflicts with itself.
    ///
    /// # Errors
    ///
    /// `NotFound(Assignment)` if `id` is absent, otherwise as [`Self::create`].
    pub async fn update(
        &self,
        id: &str,
        driver_id: &str,
        truck_id: &str,
        date: NaiveDate,
    ) -> FleetResult<AssignmentDetail> {
        if self.store.find_assignment(id).await?.is_none() {
            return Err(FleetError::not_found(EntityKind::Assignment));
        }
        let (driver, truck) = self
            .validate(driver_id, truck_id, date, Some(id))
            .await
            .inspect_err(|e| debug!(%id, %driver_id, %truck_id, %date, "update rejected: {e}"))?;

        let assignment = Assignment {
            id: id.to_string(),
            driver_id: driver.id.clone(),
            truck_id: truck.id.clone(),
            date,
        };
        let updated = self
            .store
            .update_assignment(&assignment)
            .await
            .map_err(|e| write_error(e, &assignment))?;
        if !updated {
            return Err(FleetError::not_found(EntityKind::Assignment));
        }

        info!(%id, %driver_id, %truck_id, %date, "assignment updated");
        Ok(AssignmentDetail::compose(&assignment, &driver, &truck))
    }

    /// # Errors
    ///
    /// `NotFound(Assignment)` if `id` is absent.
    pub async fn delete(&self, id: &str) -> FleetResult<()> {
        if !self.store.delete_assignment(id).await? {
            return Err(FleetError::not_found(EntityKind::Assignment));
        }
        info!(%id, "assignment deleted");
        Ok(())
    }

    /// Returns the assignment joined with its current driver and truck.
    ///
    /// # Errors
    ///
    /// `NotFound(Assignment)` if `id` is absent; `Fault` if a referenced
    /// driver or truck has vanished.
    pub async fn get(&self, id: &str) -> FleetResult<AssignmentDetail> {
        let assignment = self
            .store
            .find_assignment(id)
            .await?
            .ok_or_else(|| FleetError::not_found(EntityKind::Assignment))?;

        let driver = self.store.find_driver(&assignment.driver_id).await?;
        let truck = self.store.find_truck(&assignment.truck_id).await?;
        match (driver, truck) {
            (Some(driver), Some(truck)) => {
                Ok(AssignmentDetail::compose(&assignment, &driver, &truck))
            }
            _ => Err(FleetError::Fault(anyhow!(
                "assignment {} references a missing driver or truck",
                assignment.id
            ))),
        }
    }

    /// All assignments ordered by date then id, joined with current state.
    ///
    /// Rows with a dangling reference are skipped.
    ///
    /// # Errors
    ///
    /// `Fault` on store failure.
    pub async fn list(&self) -> FleetResult<Vec<AssignmentDetail>> {
        let assignments = self.store.list_assignments().await?;
        let drivers: HashMap<String, Driver> = self
            .store
            .list_drivers()
            .await?
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();
        let trucks: HashMap<String, Truck> = self
            .store
            .list_trucks()
            .await?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        let details = assignments
            .iter()
            .filter_map(|a| {
                match (drivers.get(&a.driver_id), trucks.get(&a.truck_id)) {
                    (Some(driver), Some(truck)) => {
                        Some(AssignmentDetail::compose(a, driver, truck))
                    }
                    _ => {
                        warn!(id = %a.id, "skipping assignment with missing driver or truck");
                        None
                    }
                }
            })
            .collect();
        Ok(details)
    }

    /// `true` iff no assignment books `truck_id` on `date`.
    ///
    /// Unknown trucks are reported as available.
    ///
    /// # Errors
    ///
    /// `Fault` on store failure.
    pub async fn check_availability(&self, truck_id: &str, date: NaiveDate) -> FleetResult<bool> {
        let booked = self.store.find_assignment_for_truck(truck_id, date).await?;
        Ok(booked.is_none())
    }

    async fn validate(
        &self,
        driver_id: &str,
        truck_id: &str,
        date: NaiveDate,
        exclude: Option<&str>,
    ) -> FleetResult<(Driver, Truck)> {
        let driver = self
            .store
            .find_driver(driver_id)
            .await?
            .ok_or_else(|| FleetError::not_found(EntityKind::Driver))?;
        let truck = self
            .store
            .find_truck(truck_id)
            .await?
            .ok_or_else(|| FleetError::not_found(EntityKind::Truck))?;

        if !driver.license_type.meets(truck.min_license_type) {
            return Err(FleetError::LicenseMismatch {
                driver: driver.license_type,
                required: truck.min_license_type,
            });
        }

        let booked = self.store.assignments_on(date).await?;
        if let Some(field) = first_conflict(&booked, driver_id, truck_id, date, exclude) {
            let resource_id = match field {
                ResourceField::Driver => driver_id,
                ResourceField::Truck => truck_id,
            };
            return Err(FleetError::conflict(field, resource_id, date));
        }

        Ok((driver, truck))
    }
}

/// Maps a constraint violation raised by a racing writer to the outcome the
/// application checks would have produced.
fn write_error(err: StoreError, assignment: &Assignment) -> FleetError {
    match err {
        StoreError::UniqueViolation(Constraint::AssignmentDriverDate) => FleetError::conflict(
            ResourceField::Driver,
            &assignment.driver_id,
            assignment.date,
        ),
        StoreError::UniqueViolation(Constraint::AssignmentTruckDate) => FleetError::conflict(
            ResourceField::Truck,
            &assignment.truck_id,
            assignment.date,
        ),
        StoreError::ForeignKeyViolation(Constraint::AssignmentDriver) => {
            FleetError::not_found(EntityKind::Driver)
        }
        StoreError::ForeignKeyViolation(Constraint::AssignmentTruck) => {
            FleetError::not_found(EntityKind::Truck)
        }
        other => other.into(),
    }
}
