use std::error::Error;

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::config::{LogFormat, LogSettings, OtelSettings},
    telemetry::otel,
};

impl LogSettings {
    fn default_filter(&self) -> String {
        let level = self.level.as_str().to_lowercase();
        format!("{level},tower_http=info,sqlx=warn")
    }
}

/// Installs the global subscriber: `RUST_LOG` wins over `LOG_LEVEL`, output is
/// pretty or JSON per `LOG_FORMAT`, and spans are exported over OTLP when a
/// collector is configured.
pub fn init_tracing(
    settings: &LogSettings,
    otel_settings: Option<&OtelSettings>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_filter()));
    let otel_layer = otel::build_otel_layer(otel_settings)?;

    let fmt_layer = match settings.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

pub fn shutdown_tracing() {
    otel::shutdown_tracer_provider();
}
