use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// RAII guard returned by [`init_telemetry`]. Currently a no-op on drop;
/// kept as a handle so callers don't need to change if a flushed exporter
/// is added back later.
pub struct TelemetryGuard;

/// Initializes process-wide structured logging.
///
/// Configuration is driven by environment variables:
/// - `RUST_LOG` for log filtering (defaults to `info`)
/// - `LOG_FORMAT=json` for machine-readable output, otherwise human text
pub fn init_telemetry(_service_name: &str) -> TelemetryGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = Registry::default().with(env_filter);

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        let fmt_layer = tracing_subscriber::fmt::layer().json().flatten_event(true);
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer();
        registry.with(fmt_layer).init();
    }

    TelemetryGuard
}
