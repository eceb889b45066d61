//! `PostgreSQL` [`FleetStore`] implementation.
//!
//! Integrity rules are enforced by named table constraints; violations come
//! back from the database and are mapped to [`StoreError`] by constraint name.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use fleet_core::{Assignment, Driver, ErrorLog, LicenseCategory, Truck};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::storage::error::{Constraint, StoreError};
use crate::traits::FleetStore;

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS drivers (
        id TEXT CONSTRAINT drivers_pkey PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        license_type VARCHAR(1) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS trucks (
        id TEXT CONSTRAINT trucks_pkey PRIMARY KEY,
        plate VARCHAR(50) NOT NULL CONSTRAINT trucks_plate_key UNIQUE,
        min_license_type VARCHAR(1) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS assignments (
        id TEXT CONSTRAINT assignments_pkey PRIMARY KEY,
        driver_id TEXT NOT NULL CONSTRAINT assignments_driver_id_fkey
            REFERENCES drivers (id) ON DELETE RESTRICT,
        truck_id TEXT NOT NULL CONSTRAINT assignments_truck_id_fkey
            REFERENCES trucks (id) ON DELETE RESTRICT,
        date DATE NOT NULL,
        CONSTRAINT assignments_driver_id_date_key UNIQUE (driver_id, date),
        CONSTRAINT assignments_truck_id_date_key UNIQUE (truck_id, date)
    )",
    "CREATE TABLE IF NOT EXISTS error_logs (
        id TEXT PRIMARY KEY,
        \"timestamp\" TIMESTAMPTZ NOT NULL,
        error_message VARCHAR(1024) NOT NULL,
        stack_trace VARCHAR(2048) NOT NULL,
        endpoint VARCHAR(255) NOT NULL
    )",
];

#[derive(sqlx::FromRow)]
struct DriverRow {
    id: String,
    name: String,
    license_type: String,
}

impl TryFrom<DriverRow> for Driver {
    type Error = StoreError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            license_type: parse_category(&row.license_type)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TruckRow {
    id: String,
    plate: String,
    min_license_type: String,
}

impl TryFrom<TruckRow> for Truck {
    type Error = StoreError;

    fn try_from(row: TruckRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            plate: row.plate,
            min_license_type: parse_category(&row.min_license_type)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    id: String,
    driver_id: String,
    truck_id: String,
    date: NaiveDate,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            id: row.id,
            driver_id: row.driver_id,
            truck_id: row.truck_id,
            date: row.date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ErrorLogRow {
    id: String,
    timestamp: DateTime<Utc>,
    error_message: String,
    stack_trace: String,
    endpoint: String,
}

impl From<ErrorLogRow> for ErrorLog {
    fn from(row: ErrorLogRow) -> Self {
        Self {
            id: row.id,
            timestamp: row.timestamp,
            error_message: row.error_message,
            stack_trace: row.stack_trace,
            endpoint: row.endpoint,
        }
    }
}

fn parse_category(raw: &str) -> Result<LicenseCategory, StoreError> {
    raw.trim()
        .parse::<LicenseCategory>()
        .with_context(|| format!("corrupt license category in store: {raw:?}"))
        .map_err(StoreError::Backend)
}

/// Translates a driver error, keeping named constraint violations apart
/// from everything else.
fn map_db_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if let Some(constraint) = db_err.constraint().and_then(Constraint::from_name) {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
        }
    }
    StoreError::Backend(anyhow::Error::new(err))
}

/// Connection-pooled store backed by `PostgreSQL`.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects a pool of at most `max_connections` to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .context("failed to connect to database")?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl FleetStore for PostgresStore {
    async fn initialize(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("failed to create schema")?;
        }
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.pool.close().await;
        Ok(())
    }

    async fn find_driver(&self, id: &str) -> Result<Option<Driver>, StoreError> {
        sqlx::query_as::<_, DriverRow>(
            "SELECT id, name, license_type FROM drivers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .map(Driver::try_from)
        .transpose()
    }

    async fn list_drivers(&self) -> Result<Vec<Driver>, StoreError> {
        sqlx::query_as::<_, DriverRow>(
            "SELECT id, name, license_type FROM drivers ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?
        .into_iter()
        .map(Driver::try_from)
        .collect()
    }

    async fn insert_driver(&self, driver: &Driver) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO drivers (id, name, license_type) VALUES ($1, $2, $3)")
            .bind(&driver.id)
            .bind(&driver.name)
            .bind(driver.license_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn update_driver(&self, driver: &Driver) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE drivers SET name = $2, license_type = $3 WHERE id = $1")
            .bind(&driver.id)
            .bind(&driver.name)
            .bind(driver.license_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_driver(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_truck(&self, id: &str) -> Result<Option<Truck>, StoreError> {
        sqlx::query_as::<_, TruckRow>(
            "SELECT id, plate, min_license_type FROM trucks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .map(Truck::try_from)
        .transpose()
    }

    async fn find_truck_by_plate(&self, plate: &str) -> Result<Option<Truck>, StoreError> {
        sqlx::query_as::<_, TruckRow>(
            "SELECT id, plate, min_license_type FROM trucks WHERE plate = $1",
        )
        .bind(plate)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .map(Truck::try_from)
        .transpose()
    }

    async fn list_trucks(&self) -> Result<Vec<Truck>, StoreError> {
        sqlx::query_as::<_, TruckRow>(
            "SELECT id, plate, min_license_type FROM trucks ORDER BY plate",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?
        .into_iter()
        .map(Truck::try_from)
        .collect()
    }

    async fn insert_truck(&self, truck: &Truck) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO trucks (id, plate, min_license_type) VALUES ($1, $2, $3)")
            .bind(&truck.id)
            .bind(&truck.plate)
            .bind(truck.min_license_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn update_truck(&self, truck: &Truck) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE trucks SET plate = $2, min_license_type = $3 WHERE id = $1")
                .bind(&truck.id)
                .bind(&truck.plate)
                .bind(truck.min_license_type.as_str())
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_truck(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM trucks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            "SELECT id, driver_id, truck_id, date FROM assignments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(Assignment::from))
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            "SELECT id, driver_id, truck_id, date FROM assignments ORDER BY date, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Assignment::from).collect())
    }

    async fn assignments_on(&self, date: NaiveDate) -> Result<Vec<Assignment>, StoreError> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            "SELECT id, driver_id, truck_id, date FROM assignments WHERE date = $1",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Assignment::from).collect())
    }

    async fn find_assignment_for_truck(
        &self,
        truck_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Assignment>, StoreError> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            "SELECT id, driver_id, truck_id, date FROM assignments \
             WHERE truck_id = $1 AND date = $2",
        )
        .bind(truck_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(Assignment::from))
    }

    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO assignments (id, driver_id, truck_id, date) VALUES ($1, $2, $3, $4)",
        )
        .bind(&assignment.id)
        .bind(&assignment.driver_id)
        .bind(&assignment.truck_id)
        .bind(assignment.date)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(())
    }

    async fn update_assignment(&self, assignment: &Assignment) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE assignments SET driver_id = $2, truck_id = $3, date = $4 WHERE id = $1",
        )
        .bind(&assignment.id)
        .bind(&assignment.driver_id)
        .bind(&assignment.truck_id)
        .bind(assignment.date)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_assignment(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_error_log(&self, entry: &ErrorLog) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO error_logs (id, \"timestamp\", error_message, stack_trace, endpoint) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&entry.id)
        .bind(entry.timestamp)
        .bind(&entry.error_message)
        .bind(&entry.stack_trace)
        .bind(&entry.endpoint)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(())
    }

    async fn error_logs(&self) -> Result<Vec<ErrorLog>, StoreError> {
        let rows = sqlx::query_as::<_, ErrorLogRow>(
            "SELECT id, \"timestamp\", error_message, stack_trace, endpoint \
             FROM error_logs ORDER BY \"timestamp\", id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.into_iter().map(ErrorLog::from).collect())
    }
}
