//! Tracing subscriber setup with optional OpenTelemetry export

use opentelemetry::{KeyValue, trace::TracerProvider as _};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource, runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider},
};
use tracing_subscriber::{
    Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use super::config::TracingConfig;
use crate::infrastructure::logging::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize tracing with optional OpenTelemetry export.
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing(logging_config: &LoggingConfig, tracing_config: &TracingConfig) {
    let fmt_layer = fmt_layer(&logging_config.format);

    let telemetry = if tracing_config.enabled {
        Some(init_otel_tracing(tracing_config))
    } else {
        None
    };

    match telemetry {
        Some(Ok(tracer_provider)) => {
            let tracer = tracer_provider.tracer("docqa");
            opentelemetry::global::set_tracer_provider(tracer_provider);

            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .with(logging_config.env_filter())
                .init();

            tracing::info!(
                "Tracing initialized with OpenTelemetry export to {}",
                tracing_config.otlp_endpoint
            );
        }
        Some(Err(e)) => {
            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(logging_config.env_filter())
                .init();

            tracing::warn!("Failed to initialize OpenTelemetry: {}. Tracing disabled.", e);
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(logging_config.env_filter())
                .init();

            tracing::debug!("Tracing initialized (OpenTelemetry disabled)");
        }
    }
}

fn fmt_layer(format: &LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    }
}

fn sampler(ratio: f64) -> Sampler {
    if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(ratio)
    }
}

fn init_otel_tracing(
    config: &TracingConfig,
) -> Result<TracerProvider, opentelemetry::trace::TraceError> {
    let resource = Resource::new(vec![KeyValue::new(
        "service.name",
        config.service_name.clone(),
    )]);

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_sampler(sampler(config.sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .with_batch_exporter(exporter, runtime::Tokio)
        .build();

    Ok(provider)
}

/// Shutdown tracing and flush pending spans
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
    tracing::debug!("Tracing shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_selection() {
        assert!(matches!(sampler(1.0), Sampler::AlwaysOn));
        assert!(matches!(sampler(0.0), Sampler::AlwaysOff));
        assert!(matches!(sampler(0.5), Sampler::TraceIdRatioBased(r) if r == 0.5));
    }
}
