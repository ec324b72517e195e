//! Logging setup for programs embedding the catalog.
//!
//! The library itself only emits through the `log` macros. A dashboard (or a
//! test) calls [`init`] once to route those records to stderr via
//! `env_logger`, with `RUST_LOG` taking precedence over the default filter.
//!
//! ```no_run
//! douane_insight::logging::init("info").expect("Failed to initialize logging");
//! log::info!("Dashboard started");
//! ```

use anyhow::{Context as _, Result};

/// Filter used when neither the caller nor `RUST_LOG` picks one.
pub const DEFAULT_FILTER: &str = "douane_insight=info";

/// Installs `env_logger` as the global logger.
///
/// # Errors
///
/// Returns an error if a global logger is already installed.
pub fn init(default_filter: &str) -> Result<()> {
    let filter = if default_filter.trim().is_empty() {
        DEFAULT_FILTER
    } else {
        default_filter
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init()
        .context("Failed to install logger")?;

    log::debug!("Logging initialized with default filter '{filter}'");
    Ok(())
}

/// Best-effort logger for tests; repeated calls are ignored.
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
