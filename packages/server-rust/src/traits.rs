use async_trait::async_trait;
use chrono::NaiveDate;
use fleet_core::{Assignment, Driver, ErrorLog, Truck};

use crate::storage::StoreError;

/// Pluggable persistence backend for fleet records.
/// Implementations: in-memory (default, tests), `PostgreSQL` (`postgres` feature).
///
/// Every write is atomic with respect to concurrent callers and enforces the
/// store-level constraints itself:
/// - truck plates are unique,
/// - at most one assignment per `(driver_id, date)` and per `(truck_id, date)`,
/// - assignments reference existing drivers and trucks, and a referenced
///   driver or truck cannot be deleted.
///
/// Violations are reported as [`StoreError::UniqueViolation`] or
/// [`StoreError::ForeignKeyViolation`] naming the constraint.
#[async_trait]
pub trait FleetStore: Send + Sync {
    /// One-time initialization (e.g., create tables).
    async fn initialize(&self) -> anyhow::Result<()>;

    /// Release resources and close connections.
    async fn close(&self) -> anyhow::Result<()>;

    async fn find_driver(&self, id: &str) -> Result<Option<Driver>, StoreError>;

    /// All drivers, ordered by name.
    async fn list_drivers(&self) -> Result<Vec<Driver>, StoreError>;

    async fn insert_driver(&self, driver: &Driver) -> Result<(), StoreError>;

    /// Overwrites a driver. Returns `false` if no driver has that id.
    async fn update_driver(&self, driver: &Driver) -> Result<bool, StoreError>;

    /// Removes a driver. Returns `false` if no driver has that id.
    async fn delete_driver(&self, id: &str) -> Result<bool, StoreError>;

    async fn find_truck(&self, id: &str) -> Result<Option<Truck>, StoreError>;

    async fn find_truck_by_plate(&self, plate: &str) -> Result<Option<Truck>, StoreError>;

    /// All trucks, ordered by plate.
    async fn list_trucks(&self) -> Result<Vec<Truck>, StoreError>;

    async fn insert_truck(&self, truck: &Truck) -> Result<(), StoreError>;

    /// Overwrites a truck. Returns `false` if no truck has that id.
    async fn update_truck(&self, truck: &Truck) -> Result<bool, StoreError>;

    /// Removes a truck. Returns `false` if no truck has that id.
    async fn delete_truck(&self, id: &str) -> Result<bool, StoreError>;

    async fn find_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError>;

    /// All assignments, ordered by date then id.
    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError>;

    /// All assignments booked on `date`.
    async fn assignments_on(&self, date: NaiveDate) -> Result<Vec<Assignment>, StoreError>;

    /// The assignment booking `truck_id` on `date`, if any.
    async fn find_assignment_for_truck(
        &self,
        truck_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Assignment>, StoreError>;

    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StoreError>;

    /// Overwrites an assignment. Returns `false` if no assignment has that id.
    async fn update_assignment(&self, assignment: &Assignment) -> Result<bool, StoreError>;

    /// Removes an assignment. Returns `false` if no assignment has that id.
    async fn delete_assignment(&self, id: &str) -> Result<bool, StoreError>;

    async fn insert_error_log(&self, entry: &ErrorLog) -> Result<(), StoreError>;

    /// All recorded faults, oldest first.
    async fn error_logs(&self) -> Result<Vec<ErrorLog>, StoreError>;
}

/// Sink for unhandled faults.
///
/// A failing recorder must never change the response already chosen for
/// the request that faulted; callers log and drop its errors.
#[async_trait]
pub trait ErrorRecorder: Send + Sync {
    async fn record(&self, entry: ErrorLog) -> anyhow::Result<()>;
}
