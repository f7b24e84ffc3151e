use std::{error::Error, sync::OnceLock};

use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, propagation::TraceContextPropagator, trace as sdktrace};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::Registry;

use crate::app::config::OtelSettings;

const TRACER_NAME: &str = "roadmap-feedback";

static TRACER_PROVIDER: OnceLock<sdktrace::SdkTracerProvider> = OnceLock::new();

/// Builds the OTLP export layer, or `None` when no collector endpoint is set.
pub fn build_otel_layer(
    settings: Option<&OtelSettings>,
) -> Result<Option<OpenTelemetryLayer<Registry, sdktrace::Tracer>>, Box<dyn Error + Send + Sync>> {
    let Some(settings) = settings else {
        return Ok(None);
    };

    global::set_text_map_propagator(TraceContextPropagator::new());

    let resource = Resource::builder()
        .with_service_name(settings.service_name.clone())
        .with_attribute(KeyValue::new(
            "service.version",
            env!("CARGO_PKG_VERSION").to_string(),
        ))
        .build();

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(settings.endpoint.clone())
        .build()?;

    let tracer_provider = sdktrace::SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build();

    let tracer = tracer_provider.tracer(TRACER_NAME);
    let _ = TRACER_PROVIDER.set(tracer_provider.clone());
    global::set_tracer_provider(tracer_provider);

    Ok(Some(OpenTelemetryLayer::new(tracer)))
}

pub fn shutdown_tracer_provider() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(err) = provider.shutdown() {
            tracing::warn!("OpenTelemetry tracer shutdown failed: {}", err);
        }
    }
}
