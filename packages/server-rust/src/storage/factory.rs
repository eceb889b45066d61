//! Startup selection of the [`FleetStore`] engine.

use std::sync::Arc;

use tracing::info;

use crate::storage::engines::MemoryStore;
use crate::traits::FleetStore;

/// Default upper bound on pooled database connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Which engine to open and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Process-local tables; contents are lost on restart.
    Memory,
    /// `PostgreSQL` at `url`.
    Postgres { url: String, max_connections: u32 },
}

impl StoreConfig {
    /// Postgres when a database URL is given, memory otherwise.
    #[must_use]
    pub fn from_database_url(url: Option<String>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => Self::Postgres {
                url,
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
            _ => Self::Memory,
        }
    }
}

/// Opens and initializes the configured store.
///
/// # Errors
///
/// Fails if the database is unreachable, the schema cannot be created, or a
/// database URL is configured in a build without the `postgres` feature.
pub async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn FleetStore>> {
    let store: Arc<dyn FleetStore> = match config {
        StoreConfig::Memory => {
            info!("using in-memory store");
            Arc::new(MemoryStore::new())
        }
        StoreConfig::Postgres {
            url,
            max_connections,
        } => open_postgres(url, *max_connections).await?,
    };
    store.initialize().await?;
    Ok(store)
}

#[cfg(feature = "postgres")]
async fn open_postgres(url: &str, max_connections: u32) -> anyhow::Result<Arc<dyn FleetStore>> {
    info!(max_connections, "connecting to PostgreSQL store");
    let store = crate::storage::engines::PostgresStore::connect(url, max_connections).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
async fn open_postgres(_url: &str, _max_connections: u32) -> anyhow::Result<Arc<dyn FleetStore>> {
    anyhow::bail!("DATABASE_URL is set but this build lacks the `postgres` feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_missing_url_selects_memory() {
        assert_eq!(StoreConfig::from_database_url(None), StoreConfig::Memory);
        assert_eq!(
            StoreConfig::from_database_url(Some("  ".to_string())),
            StoreConfig::Memory
        );
    }

    #[test]
    fn url_selects_postgres_with_default_pool() {
        let config = StoreConfig::from_database_url(Some("postgres://localhost/fleet".into()));
        assert_eq!(
            config,
            StoreConfig::Postgres {
                url: "postgres://localhost/fleet".to_string(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            }
        );
    }

    #[tokio::test]
    async fn memory_store_opens_empty() {
        let store = open_store(&StoreConfig::Memory).await.unwrap();
        assert!(store.list_drivers().await.unwrap().is_empty());
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn database_url_without_feature_is_rejected() {
        let config = StoreConfig::from_database_url(Some("postgres://localhost/fleet".into()));
        let err = open_store(&config).await.err().unwrap();
        assert!(err.to_string().contains("postgres"));
    }
}
