//! Tracing subscriber setup.
//!
//! JSON output (one object per event) is meant for log aggregation;
//! `pretty` is the human-readable console format for local runs.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `--log-filter` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,fleet_server=debug";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Parses a filter directive such as `info,fleet_server=debug`.
///
/// # Errors
///
/// Fails on an unknown level or malformed directive.
pub fn parse_filter(filter: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| anyhow::anyhow!("invalid log filter `{filter}`: {e}"))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if `filter` is not a valid directive or a global subscriber is
/// already installed.
pub fn init_logging(filter: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter_layer = parse_filter(filter)?;
    let registry = tracing_subscriber::registry().with(filter_layer);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .flatten_event(true),
            )
            .try_init()?,
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init()?,
    }

    tracing::info!(filter = %filter, ?format, "Logging initialized");
    Ok(())
}
