//! In-memory [`FleetStore`] implementation.
//!
//! All tables live behind a single [`RwLock`], so every write checks all
//! constraints and applies the change under one lock acquisition. This gives
//! the same guarantee as the unique and foreign-key constraints of the
//! relational schema: two concurrent inserts for the same driver and date
//! cannot both succeed.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use fleet_core::{Assignment, Driver, ErrorLog, Truck};
use parking_lot::RwLock;

use crate::storage::error::{Constraint, StoreError};
use crate::traits::FleetStore;

#[derive(Default)]
struct Tables {
    drivers: HashMap<String, Driver>,
    trucks: HashMap<String, Truck>,
    assignments: HashMap<String, Assignment>,
    error_logs: Vec<ErrorLog>,
}

impl Tables {
    fn check_plate(&self, truck: &Truck) -> Result<(), StoreError> {
        let taken = self
            .trucks
            .values()
            .any(|t| t.plate == truck.plate && t.id != truck.id);
        if taken {
            Err(StoreError::UniqueViolation(Constraint::TruckPlate))
        } else {
            Ok(())
        }
    }

    /// Referential and per-day uniqueness checks for an assignment write.
    /// `assignment.id` itself is ignored so updates do not collide with
    /// their own previous row.
    fn check_assignment(&self, assignment: &Assignment) -> Result<(), StoreError> {
        if !self.drivers.contains_key(&assignment.driver_id) {
            return Err(StoreError::ForeignKeyViolation(Constraint::AssignmentDriver));
        }
        if !self.trucks.contains_key(&assignment.truck_id) {
            return Err(StoreError::ForeignKeyViolation(Constraint::AssignmentTruck));
        }
        let same_day: Vec<&Assignment> = self
            .assignments
            .values()
            .filter(|a| a.date == assignment.date && a.id != assignment.id)
            .collect();
        // Driver clashes win over truck clashes regardless of map order.
        if same_day.iter().any(|a| a.driver_id == assignment.driver_id) {
            return Err(StoreError::UniqueViolation(Constraint::AssignmentDriverDate));
        }
        if same_day.iter().any(|a| a.truck_id == assignment.truck_id) {
            return Err(StoreError::UniqueViolation(Constraint::AssignmentTruckDate));
        }
        Ok(())
    }

    fn is_referenced(&self, pred: impl Fn(&Assignment) -> bool) -> bool {
        self.assignments.values().any(pred)
    }
}

/// Process-local store for development and tests.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FleetStore for MemoryStore {
    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn find_driver(&self, id: &str) -> Result<Option<Driver>, StoreError> {
        Ok(self.tables.read().drivers.get(id).cloned())
    }

    async fn list_drivers(&self) -> Result<Vec<Driver>, StoreError> {
        let mut drivers: Vec<Driver> = self.tables.read().drivers.values().cloned().collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(drivers)
    }

    async fn insert_driver(&self, driver: &Driver) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.drivers.contains_key(&driver.id) {
            return Err(StoreError::UniqueViolation(Constraint::DriverPrimaryKey));
        }
        tables.drivers.insert(driver.id.clone(), driver.clone());
        Ok(())
    }

    async fn update_driver(&self, driver: &Driver) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        match tables.drivers.get_mut(&driver.id) {
            Some(slot) => {
                *slot = driver.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_driver(&self, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        if !tables.drivers.contains_key(id) {
            return Ok(false);
        }
        if tables.is_referenced(|a| a.driver_id == id) {
            return Err(StoreError::ForeignKeyViolation(Constraint::AssignmentDriver));
        }
        tables.drivers.remove(id);
        Ok(true)
    }

    async fn find_truck(&self, id: &str) -> Result<Option<Truck>, StoreError> {
        Ok(self.tables.read().trucks.get(id).cloned())
    }

    async fn find_truck_by_plate(&self, plate: &str) -> Result<Option<Truck>, StoreError> {
        Ok(self
            .tables
            .read()
            .trucks
            .values()
            .find(|t| t.plate == plate)
            .cloned())
    }

    async fn list_trucks(&self) -> Result<Vec<Truck>, StoreError> {
        let mut trucks: Vec<Truck> = self.tables.read().trucks.values().cloned().collect();
        trucks.sort_by(|a, b| a.plate.cmp(&b.plate));
        Ok(trucks)
    }

    async fn insert_truck(&self, truck: &Truck) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.trucks.contains_key(&truck.id) {
            return Err(StoreError::UniqueViolation(Constraint::TruckPrimaryKey));
        }
        tables.check_plate(truck)?;
        tables.trucks.insert(truck.id.clone(), truck.clone());
        Ok(())
    }

    async fn update_truck(&self, truck: &Truck) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        if !tables.trucks.contains_key(&truck.id) {
            return Ok(false);
        }
        tables.check_plate(truck)?;
        tables.trucks.insert(truck.id.clone(), truck.clone());
        Ok(true)
    }

    async fn delete_truck(&self, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        if !tables.trucks.contains_key(id) {
            return Ok(false);
        }
        if tables.is_referenced(|a| a.truck_id == id) {
            return Err(StoreError::ForeignKeyViolation(Constraint::AssignmentTruck));
        }
        tables.trucks.remove(id);
        Ok(true)
    }

    async fn find_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError> {
        Ok(self.tables.read().assignments.get(id).cloned())
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        let mut assignments: Vec<Assignment> =
            self.tables.read().assignments.values().cloned().collect();
        assignments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(assignments)
    }

    async fn assignments_on(&self, date: NaiveDate) -> Result<Vec<Assignment>, StoreError> {
        Ok(self
            .tables
            .read()
            .assignments
            .values()
            .filter(|a| a.date == date)
            .cloned()
            .collect())
    }

    async fn find_assignment_for_truck(
        &self,
        truck_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Assignment>, StoreError> {
        Ok(self
            .tables
            .read()
            .assignments
            .values()
            .find(|a| a.truck_id == truck_id && a.date == date)
            .cloned())
    }

    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.assignments.contains_key(&assignment.id) {
            return Err(StoreError::UniqueViolation(Constraint::AssignmentPrimaryKey));
        }
        tables.check_assignment(assignment)?;
        tables
            .assignments
            .insert(assignment.id.clone(), assignment.clone());
        Ok(())
    }

    async fn update_assignment(&self, assignment: &Assignment) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        if !tables.assignments.contains_key(&assignment.id) {
            return Ok(false);
        }
        tables.check_assignment(assignment)?;
        tables
            .assignments
            .insert(assignment.id.clone(), assignment.clone());
        Ok(true)
    }

    async fn delete_assignment(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.tables.write().assignments.remove(id).is_some())
    }

    async fn insert_error_log(&self, entry: &ErrorLog) -> Result<(), StoreError> {
        self.tables.write().error_logs.push(entry.clone());
        Ok(())
    }

    async fn error_logs(&self) -> Result<Vec<ErrorLog>, StoreError> {
        Ok(self.tables.read().error_logs.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fleet_core::LicenseCategory;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
    }

    fn driver(id: &str) -> Driver {
        Driver {
            id: id.to_string(),
            name: format!("Driver {id}"),
            license_type: LicenseCategory::C,
        }
    }

    fn truck(id: &str, plate: &str) -> Truck {
        Truck {
            id: id.to_string(),
            plate: plate.to_string(),
            min_license_type: LicenseCategory::C,
        }
    }

    fn booking(id: &str, driver_id: &str, truck_id: &str, date: NaiveDate) -> Assignment {
        Assignment {
            id: id.to_string(),
            driver_id: driver_id.to_string(),
            truck_id: truck_id.to_string(),
            date,
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_driver(&driver("d1")).await.unwrap();
        store.insert_driver(&driver("d2")).await.unwrap();
        store.insert_truck(&truck("t1", "AAA-1")).await.unwrap();
        store.insert_truck(&truck("t2", "BBB-2")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn insert_find_delete_driver() {
        let store = MemoryStore::new();
        store.insert_driver(&driver("d1")).await.unwrap();

        assert_eq!(store.find_driver("d1").await.unwrap(), Some(driver("d1")));
        assert!(store.delete_driver("d1").await.unwrap());
        assert!(!store.delete_driver("d1").await.unwrap());
        assert_eq!(store.find_driver("d1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_missing_row_reports_false() {
        let store = MemoryStore::new();
        assert!(!store.update_driver(&driver("nope")).await.unwrap());
        assert!(!store.update_truck(&truck("nope", "P")).await.unwrap());
        assert!(!store
            .update_assignment(&booking("nope", "d1", "t1", day(15)))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn plate_is_unique_across_trucks() {
        let store = seeded().await;
        let err = store.insert_truck(&truck("t3", "AAA-1")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation(Constraint::TruckPlate)
        ));

        // Re-saving a truck with its own plate is fine; taking another's is not.
        assert!(store.update_truck(&truck("t1", "AAA-1")).await.unwrap());
        let err = store.update_truck(&truck("t1", "BBB-2")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation(Constraint::TruckPlate)
        ));
    }

    #[tokio::test]
    async fn one_booking_per_driver_and_truck_per_day() {
        let store = seeded().await;
        store
            .insert_assignment(&booking("a1", "d1", "t1", day(15)))
            .await
            .unwrap();

        let err = store
            .insert_assignment(&booking("a2", "d1", "t2", day(15)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation(Constraint::AssignmentDriverDate)
        ));

        let err = store
            .insert_assignment(&booking("a3", "d2", "t1", day(15)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation(Constraint::AssignmentTruckDate)
        ));

        store
            .insert_assignment(&booking("a4", "d1", "t1", day(16)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn driver_clash_reported_before_truck_clash_in_separate_rows() {
        // Fresh maps get fresh hash seeds, so repeat to cover iteration orders.
        for _ in 0..64 {
            let store = seeded().await;
            store.insert_driver(&driver("d9")).await.unwrap();
            store.insert_truck(&truck("t9", "ZZZ-9")).await.unwrap();
            store
                .insert_assignment(&booking("a1", "d1", "t9", day(15)))
                .await
                .unwrap();
            store
                .insert_assignment(&booking("a2", "d9", "t1", day(15)))
                .await
                .unwrap();

            let err = store
                .insert_assignment(&booking("a3", "d1", "t1", day(15)))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                StoreError::UniqueViolation(Constraint::AssignmentDriverDate)
            ));
        }
    }

    #[tokio::test]
    async fn update_does_not_collide_with_own_row() {
        let store = seeded().await;
        store
            .insert_assignment(&booking("a1", "d1", "t1", day(15)))
            .await
            .unwrap();
        assert!(store
            .update_assignment(&booking("a1", "d1", "t1", day(15)))
            .await
            .unwrap());
        assert!(store
            .update_assignment(&booking("a1", "d1", "t1", day(16)))
            .await
            .unwrap());
        assert_eq!(store.assignments_on(day(15)).await.unwrap().len(), 0);
        assert_eq!(store.assignments_on(day(16)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn assignment_requires_existing_references() {
        let store = seeded().await;
        let err = store
            .insert_assignment(&booking("a1", "ghost", "t1", day(15)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::ForeignKeyViolation(Constraint::AssignmentDriver)
        ));
        let err = store
            .insert_assignment(&booking("a1", "d1", "ghost", day(15)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::ForeignKeyViolation(Constraint::AssignmentTruck)
        ));
    }

    #[tokio::test]
    async fn referenced_resources_cannot_be_deleted() {
        let store = seeded().await;
        store
            .insert_assignment(&booking("a1", "d1", "t1", day(15)))
            .await
            .unwrap();

        assert!(matches!(
            store.delete_driver("d1").await.unwrap_err(),
            StoreError::ForeignKeyViolation(Constraint::AssignmentDriver)
        ));
        assert!(matches!(
            store.delete_truck("t1").await.unwrap_err(),
            StoreError::ForeignKeyViolation(Constraint::AssignmentTruck)
        ));

        assert!(store.delete_assignment("a1").await.unwrap());
        assert!(store.delete_driver("d1").await.unwrap());
        assert!(store.delete_truck("t1").await.unwrap());
    }

    #[tokio::test]
    async fn lists_are_sorted() {
        let store = seeded().await;
        store
            .insert_assignment(&booking("b", "d1", "t1", day(16)))
            .await
            .unwrap();
        store
            .insert_assignment(&booking("a", "d2", "t2", day(16)))
            .await
            .unwrap();
        store
            .insert_assignment(&booking("c", "d1", "t1", day(15)))
            .await
            .unwrap();

        let ids: Vec<String> = store
            .list_assignments()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let plates: Vec<String> = store
            .list_trucks()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.plate)
            .collect();
        assert_eq!(plates, vec!["AAA-1", "BBB-2"]);
    }

    #[tokio::test]
    async fn find_assignment_for_truck_matches_date() {
        let store = seeded().await;
        store
            .insert_assignment(&booking("a1", "d1", "t1", day(15)))
            .await
            .unwrap();
        assert!(store
            .find_assignment_for_truck("t1", day(15))
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_assignment_for_truck("t1", day(16))
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_assignment_for_truck("t2", day(15))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn concurrent_inserts_for_same_driver_day_admit_one() {
        let store = Arc::new(MemoryStore::new());
        store.insert_driver(&driver("d1")).await.unwrap();
        for i in 0..16 {
            store
                .insert_truck(&truck(&format!("t{i}"), &format!("P-{i}")))
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert_assignment(&booking(&format!("a{i}"), "d1", &format!("t{i}"), day(15)))
                    .await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.assignments_on(day(15)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn error_logs_are_kept_in_order() {
        let store = MemoryStore::new();
        store
            .insert_error_log(&ErrorLog::new("first", "trace", "/a"))
            .await
            .unwrap();
        store
            .insert_error_log(&ErrorLog::new("second", "trace", "/b"))
            .await
            .unwrap();
        let logs = store.error_logs().await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].error_message, "first");
        assert_eq!(logs[1].endpoint, "/b");
    }
}
