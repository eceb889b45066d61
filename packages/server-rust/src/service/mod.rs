//! Domain services over the [`FleetStore`](crate::traits::FleetStore).
//!
//! - [`AssignmentService`]: the only component with rules spanning entities
//! - [`DriverService`], [`TruckService`]: single-entity maintenance
//! - [`StoreErrorRecorder`]: persists faults for diagnostics

pub mod assignment;
pub mod driver;
pub mod recorder;
pub mod truck;

use std::sync::Arc;

pub use assignment::AssignmentService;
pub use driver::DriverService;
pub use recorder::StoreErrorRecorder;
pub use truck::TruckService;

use crate::traits::FleetStore;

/// The services handed to HTTP handlers, all sharing one store.
#[derive(Clone)]
pub struct FleetServices {
    pub drivers: Arc<DriverService>,
    pub trucks: Arc<TruckService>,
    pub assignments: Arc<AssignmentService>,
}

impl FleetServices {
    #[must_use]
    pub fn new(store: &Arc<dyn FleetStore>) -> Self {
        Self {
            drivers: Arc::new(DriverService::new(Arc::clone(store))),
            trucks: Arc::new(TruckService::new(Arc::clone(store))),
            assignments: Arc::new(AssignmentService::new(Arc::clone(store))),
        }
    }
}
