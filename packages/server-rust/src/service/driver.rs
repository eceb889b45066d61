use std::sync::Arc;

use fleet_core::{new_id, Driver, DriverInput, EntityKind, FleetError, FleetResult};
use tracing::info;

use crate::storage::error::in_use_or_fault;
use crate::traits::FleetStore;

/// Driver registration and maintenance.
pub struct DriverService {
    store: Arc<dyn FleetStore>,
}

impl DriverService {
    #[must_use]
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// `InvalidInput` or `InvalidCategory` for a bad payload.
    pub async fn create(&self, input: DriverInput) -> FleetResult<Driver> {
        let fields = input.validate()?;
        let driver = Driver {
            id: new_id(),
            name: fields.name,
            license_type: fields.license_type,
        };
        self.store.insert_driver(&driver).await?;
        info!(id = %driver.id, license = %driver.license_type, "driver created");
        Ok(driver)
    }

    /// # Errors
    ///
    /// `NotFound(Driver)` if `id` is absent.
    pub async fn get(&self, id: &str) -> FleetResult<Driver> {
        self.store
            .find_driver(id)
            .await?
            .ok_or_else(|| FleetError::not_found(EntityKind::Driver))
    }

    /// All drivers ordered by name.
    ///
    /// # Errors
    ///
    /// `Fault` on store failure.
    pub async fn list(&self) -> FleetResult<Vec<Driver>> {
        Ok(self.store.list_drivers().await?)
    }

    /// Replaces name and license of driver `id`. Existing assignments are
    /// left untouched even if the new license no longer covers them.
    ///
    /// # Errors
    ///
    /// `InvalidInput` or `InvalidCategory` for a bad payload,
    /// `NotFound(Driver)` if `id` is absent.
    pub async fn update(&self, id: &str, input: DriverInput) -> FleetResult<Driver> {
        let fields = input.validate()?;
        let driver = Driver {
            id: id.to_string(),
            name: fields.name,
            license_type: fields.license_type,
        };
        if !self.store.update_driver(&driver).await? {
            return Err(FleetError::not_found(EntityKind::Driver));
        }
        info!(%id, "driver updated");
        Ok(driver)
    }

    /// # Errors
    ///
    /// `NotFound(Driver)` if `id` is absent, `ResourceInUse` while any
    /// assignment references the driver.
    pub async fn delete(&self, id: &str) -> FleetResult<()> {
        let deleted = self
            .store
            .delete_driver(id)
            .await
            .map_err(|e| in_use_or_fault(e, EntityKind::Driver))?;
        if !deleted {
            return Err(FleetError::not_found(EntityKind::Driver));
        }
        info!(%id, "driver deleted");
        Ok(())
    }
}
