use std::sync::Arc;

use async_trait::async_trait;
use fleet_core::ErrorLog;

use crate::traits::{ErrorRecorder, FleetStore};

/// Writes fault entries into the `error_logs` table of the active store.
pub struct StoreErrorRecorder {
    store: Arc<dyn FleetStore>,
}

impl StoreErrorRecorder {
    #[must_use]
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ErrorRecorder for StoreErrorRecorder {
    async fn record(&self, entry: ErrorLog) -> anyhow::Result<()> {
        self.store.insert_error_log(&entry).await?;
        Ok(())
    }
}
