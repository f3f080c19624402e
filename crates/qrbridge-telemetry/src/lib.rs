//! Process-wide tracing setup.
//!
//! Logs go to stdout as JSON or human-readable lines, filtered by `RUST_LOG`.
//! When an OTLP endpoint is configured, spans are exported there as well.
//! Records emitted through the `log` facade are forwarded into `tracing`.

use clap::ValueEnum;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use typed_builder::TypedBuilder;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),

    #[error("a global subscriber is already installed: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to install the log bridge: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable, for local runs.
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OtlpProtocol {
    #[default]
    Grpc,
    HttpJson,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetryConfig {
    #[builder(setter(into))]
    pub service_name: String,

    #[builder(default)]
    pub log_format: LogFormat,

    /// Used when `RUST_LOG` is not set.
    #[builder(default = "info".to_string(), setter(into))]
    pub default_filter: String,

    #[builder(default, setter(into))]
    pub otlp_endpoint: Option<String>,

    #[builder(default)]
    pub otlp_protocol: OtlpProtocol,
}

/// Flushes exported spans when dropped. Keep it alive for the whole process.
#[must_use]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {e}");
            }
        }
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| tracer_provider(&config.service_name, endpoint, config.otlp_protocol))
        .transpose()?;
    let otel = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(config.service_name.clone())));

    let json = (config.log_format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
    });
    let pretty = (config.log_format == LogFormat::Pretty).then(|| tracing_subscriber::fmt::layer());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(&config.default_filter))
        .with(json)
        .with(pretty)
        .with(otel);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    tracing::info!(
        service = %config.service_name,
        format = ?config.log_format,
        otlp = config.otlp_endpoint.is_some(),
        "telemetry initialized"
    );
    Ok(TelemetryGuard { provider })
}

fn env_filter(default: &str) -> EnvFilter {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), default)
}

/// `RUST_LOG`-style directives win over the default unless any of them fails to parse.
fn filter_from(directives: Option<&str>, default: &str) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

fn tracer_provider(
    service_name: &str,
    endpoint: &str,
    protocol: OtlpProtocol,
) -> Result<SdkTracerProvider, TelemetryError> {
    let exporter = match protocol {
        OtlpProtocol::Grpc => opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()?,
        OtlpProtocol::HttpJson => opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .with_protocol(Protocol::HttpJson)
            .build()?,
    };

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder()
                .with_attribute(KeyValue::new("service.name", service_name.to_string()))
                .build(),
        )
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TelemetryConfig::builder().service_name("qrbridge").build();

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.default_filter, "info");
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn formats_parse_from_the_command_line() {
        assert_eq!(LogFormat::from_str("pretty", true), Ok(LogFormat::Pretty));
        assert_eq!(
            OtlpProtocol::from_str("http-json", true),
            Ok(OtlpProtocol::HttpJson)
        );
    }

    #[test]
    fn directives_fall_back_to_the_default() {
        use tracing_subscriber::filter::LevelFilter;

        let filter = filter_from(Some("debug"), "info");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = filter_from(None, "warn");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        let filter = filter_from(Some("qrbridge=nonsense"), "error");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }
}
