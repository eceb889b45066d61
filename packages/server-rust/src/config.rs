//! Command-line and environment configuration for the `fleet-server` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::logging::{LogFormat, DEFAULT_LOG_FILTER};
use crate::network::{NetworkConfig, TlsConfig};
use crate::storage::StoreConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "fleet-server")]
#[command(version)]
#[command(about = "Driver, truck and assignment scheduling API")]
pub struct ServerArgs {
    /// Bind address
    #[arg(long, env = "FLEET_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port (0 = OS-assigned)
    #[arg(long, env = "FLEET_PORT", default_value_t = 8000)]
    pub port: u16,

    /// PostgreSQL connection URL; in-memory store when absent
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Allowed CORS origins, comma separated
    #[arg(
        long = "cors-origin",
        env = "FLEET_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub cors_origins: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds
    #[arg(long, default_value_t = 30)]
    pub drain_timeout_secs: u64,

    /// PEM certificate chain; enables TLS together with --tls-key
    #[arg(long, requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key
    #[arg(long, requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Tracing filter directive
    #[arg(long, env = "RUST_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl ServerArgs {
    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        let tls = match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: cert.clone(),
                key_path: key.clone(),
            }),
            _ => None,
        };
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tls,
            cors_origins: self
                .cors_origins
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
        }
    }

    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::from_database_url(self.database_url.clone())
    }
}
