//! Structured logging configuration.
//!
//! The engine logs through the `log` facade; the subscriber below also
//! collects those records.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var. Output goes to
/// stderr so a printed plan on stdout stays valid JSON.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Log how long a generation step took
pub fn log_performance(operation: &str, duration_ms: u64, rows: usize) {
    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            rows = rows,
            "PERFORMANCE: Slow operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            rows = rows,
            "Performance metric"
        );
    }
}
