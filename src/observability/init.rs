//! Subscriber installation.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::tracer;
use crate::infrastructure::paths;
use crate::Config;

/// Service and instrumentation scope name recorded on exported spans.
const SERVICE_NAME: &str = "layout-core";

/// Installs the global tracing subscriber.
///
/// The pipeline is:
///
/// ```text
/// tracing macros → EnvFilter → fmt layer (stderr)
///                            → OpenTelemetry layer → OTLP JSON trace file (optional)
/// ```
///
/// The filter comes from `RUST_LOG` when set, then `config.trace_level`, then
/// `"info"`. The OpenTelemetry layer is only added when `config.trace_file` is
/// set; a leading `~` is expanded against the home directory and a relative
/// path is resolved inside [`paths::get_data_dir`].
///
/// Idempotent: only the first successful call installs a subscriber. Failing
/// to create the trace directory disables file export but keeps stderr output.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.trace_level.as_deref().unwrap_or("info"))
    });

    let otel_layer = config.trace_file.as_deref().and_then(|file| {
        let path = paths::resolve_trace_file(file);
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return None;
            }
        }

        let resource = Resource::new(vec![opentelemetry::KeyValue::new("service.name", SERVICE_NAME)]);
        let provider = tracer::create_tracer_provider(path, resource, SERVICE_NAME);
        let tracer = provider.tracer(SERVICE_NAME);
        let _ = opentelemetry::global::set_tracer_provider(provider);
        Some(OpenTelemetryLayer::new(tracer))
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init();
}
