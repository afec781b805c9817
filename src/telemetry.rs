use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,commerce_analytics=debug";

/// Initialize structured logging with environment-based filtering.
///
/// Defaults to INFO (DEBUG for this crate); override with `RUST_LOG`,
/// e.g. `RUST_LOG=commerce_analytics=trace`.
pub fn init() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .init();
}
