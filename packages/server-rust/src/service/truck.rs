use std::sync::Arc;

use fleet_core::{new_id, EntityKind, FleetError, FleetResult, Truck, TruckInput};
use tracing::{debug, info};

use crate::storage::error::in_use_or_fault;
use crate::storage::{Constraint, StoreError};
use crate::traits::FleetStore;

/// Truck registration and maintenance. Plates are unique across the fleet.
pub struct TruckService {
    store: Arc<dyn FleetStore>,
}

impl TruckService {
    #[must_use]
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// `InvalidInput` or `InvalidCategory` for a bad payload,
    /// `DuplicatePlate` if another truck carries the plate.
    pub async fn create(&self, input: TruckInput) -> FleetResult<Truck> {
        let fields = input.validate()?;
        self.ensure_plate_free(&fields.plate, None).await?;

        let truck = Truck {
            id: new_id(),
            plate: fields.plate,
            min_license_type: fields.min_license_type,
        };
        self.store
            .insert_truck(&truck)
            .await
            .map_err(|e| plate_error(e, &truck.plate))?;
        info!(id = %truck.id, plate = %truck.plate, "truck created");
        Ok(truck)
    }

    /// # Errors
    ///
    /// `NotFound(Truck)` if `id` is absent.
    pub async fn get(&self, id: &str) -> FleetResult<Truck> {
        self.store
            .find_truck(id)
            .await?
            .ok_or_else(|| FleetError::not_found(EntityKind::Truck))
    }

    /// All trucks ordered by plate.
    ///
    /// # Errors
    ///
    /// `Fault` on store failure.
    pub async fn list(&self) -> FleetResult<Vec<Truck>> {
        Ok(self.store.list_trucks().await?)
    }

    /// Replaces plate and minimum license of truck `id`. Keeping the
    /// truck's current plate is not a duplicate.
    ///
    /// # Errors
    ///
    /// `InvalidInput` or `InvalidCategory` for a bad payload,
    /// `NotFound(Truck)` if `id` is absent, `DuplicatePlate` if another
    /// truck carries the plate.
    pub async fn update(&self, id: &str, input: TruckInput) -> FleetResult<Truck> {
        let fields = input.validate()?;
        if self.store.find_truck(id).await?.is_none() {
            return Err(FleetError::not_found(EntityKind::Truck));
        }
        self.ensure_plate_free(&fields.plate, Some(id)).await?;

        let truck = Truck {
            id: id.to_string(),
            plate: fields.plate,
            min_license_type: fields.min_license_type,
        };
        let updated = self
            .store
            .update_truck(&truck)
            .await
            .map_err(|e| plate_error(e, &truck.plate))?;
        if !updated {
            return Err(FleetError::not_found(EntityKind::Truck));
        }
        info!(%id, plate = %truck.plate, "truck updated");
        Ok(truck)
    }

    /// # Errors
    ///
    /// `NotFound(Truck)` if `id` is absent, `ResourceInUse` while any
    /// assignment references the truck.
    pub async fn delete(&self, id: &str) -> FleetResult<()> {
        let deleted = self
            .store
            .delete_truck(id)
            .await
            .map_err(|e| in_use_or_fault(e, EntityKind::Truck))?;
        if !deleted {
            return Err(FleetError::not_found(EntityKind::Truck));
        }
        info!(%id, "truck deleted");
        Ok(())
    }

    async fn ensure_plate_free(&self, plate: &str, owner: Option<&str>) -> FleetResult<()> {
        match self.store.find_truck_by_plate(plate).await? {
            Some(existing) if Some(existing.id.as_str()) != owner => {
                debug!(%plate, holder = %existing.id, "plate already registered");
                Err(FleetError::DuplicatePlate {
                    plate: plate.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

fn plate_error(err: StoreError, plate: &str) -> FleetError {
    match err {
        StoreError::UniqueViolation(Constraint::TruckPlate) => FleetError::DuplicatePlate {
            plate: plate.to_string(),
        },
        other => other.into(),
    }
}
