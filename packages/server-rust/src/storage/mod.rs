//! Persistence for drivers, trucks, assignments and error logs.
//!
//! The [`FleetStore`](crate::traits::FleetStore) trait is the seam; this
//! module provides its engines and the factory that picks one at startup:
//!
//! - [`MemoryStore`]: single-lock in-memory tables (default, tests)
//! - `PostgresStore`: `PostgreSQL` via `sqlx` (`postgres` feature)
//!
//! Both engines enforce the same named [`Constraint`]s and report violations
//! as [`StoreError`].

pub mod engines;
pub mod error;
pub mod factory;

pub use engines::MemoryStore;
#[cfg(feature = "postgres")]
pub use engines::PostgresStore;
pub use error::{Constraint, StoreError};
pub use factory::{open_store, StoreConfig};
