//! Structured logging configuration.
//!
//! Library crates log through the `log` facade; the subscriber installed
//! here forwards those records into `tracing` alongside the server's own
//! events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Requests slower than this are logged at warn level
pub const SLOW_REQUEST_MS: u64 = 1000;

/// Initialize structured logging
///
/// # Example
///
/// ```no_run
/// use ko_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a finished API request
pub fn log_api_request(request_id: &str, method: &str, path: &str, status: u16, duration_ms: u64) {
    if duration_ms > SLOW_REQUEST_MS {
        tracing::warn!(
            request_id = request_id,
            http_method = method,
            http_path = path,
            http_status = status,
            duration_ms = duration_ms,
            "Slow request completed"
        );
    } else {
        tracing::info!(
            request_id = request_id,
            http_method = method,
            http_path = path,
            http_status = status,
            duration_ms = duration_ms,
            "Request completed"
        );
    }
}
