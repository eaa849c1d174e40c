use anyhow::Context;
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{SdkTracerProvider, Tracer};
use tierchain_core::config::Config;
use tierchain_service::INSTRUMENTATION_NAME;
use tierchain_service::log::JsonLogLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Owns the tracer provider so pending spans can be flushed on exit.
pub struct Telemetry {
    provider: SdkTracerProvider,
}

impl Telemetry {
    pub fn tracer(&self) -> Tracer {
        self.provider.tracer(INSTRUMENTATION_NAME)
    }

    pub fn shutdown(self) {
        if let Err(err) = self.provider.shutdown() {
            tracing::warn!(error = %err, "tracer provider shutdown failed");
        }
    }
}

/// JSON lines on stdout, filtered by `RUST_LOG` (default `info`).
pub fn init_logging(service: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(JsonLogLayer::new(service, std::io::stdout))
        .try_init();
}

/// Batch-exports spans over OTLP/gRPC to the configured collector.
pub fn init_tracer(cfg: &Config) -> anyhow::Result<Telemetry> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(cfg.otlp_endpoint.clone())
        .build()
        .with_context(|| format!("build OTLP span exporter for {}", cfg.otlp_endpoint))?;

    let resource = Resource::builder()
        .with_service_name(cfg.otel_service_name.clone())
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build();

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build();

    Ok(Telemetry { provider })
}
