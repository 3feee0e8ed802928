//! # Telemetry
//!
//! Tracing subscriber setup shared by the seed binary and the web backend.
//!
//! ## Filter Resolution
//! 1. `RUST_LOG`, when set and valid
//! 2. The configured filter (`logging.filter` / `MARQUEE_LOG`)
//! 3. [`DEFAULT_LOG_FILTER`]

use tracing_subscriber::EnvFilter;

/// Default `EnvFilter` directives.
pub const DEFAULT_LOG_FILTER: &str = "info,marquee=debug,sqlx=warn";

/// Resolves the filter without installing anything.
pub fn resolve_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        configured
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
    })
}

/// Installs the global fmt subscriber.
///
/// Safe to call more than once: later calls are ignored, so tests and
/// binaries can both initialize.
pub fn init_tracing(configured: Option<&str>) {
    let filter = resolve_filter(configured);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
