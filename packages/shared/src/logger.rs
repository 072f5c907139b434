//! Logging setup utilities for the sockline binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for a crate and this shared crate.
///
/// Crate names are normalized to their target form (`-` becomes `_`), so both
/// `sockline-client` and `sockline_client` produce the same directive.
pub fn default_directive(crate_name: &str, default_log_level: &str) -> String {
    format!(
        "{}={},{}={}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        default_log_level,
        crate_name.replace('-', "_"),
        default_log_level
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// Events are written to standard error. The log level can be overridden using
/// the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `crate_name` - The crate whose events should be shown (e.g., "sockline-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use sockline_shared::logger::setup_logger;
///
/// setup_logger("sockline-server", "debug");
/// ```
pub fn setup_logger(crate_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(crate_name, default_log_level).into()),
        )
        // stdout belongs to the console output
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
