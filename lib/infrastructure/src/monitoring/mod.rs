pub mod meter;

use anyhow::Context as _;
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{ExporterBuildError, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

//KNOWN ISSUES:
// - EnvFilter on layer-level looses log-statements when combined with the OTLP bridge, hence one filter per layer

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitoringConfig {
    pub service_name: String,
    pub app_name: String,
    pub logs: EnvFilterConfig,
    pub traces: EnvFilterConfig,
    #[serde(default)]
    pub format: LogFormat,
    pub otlp: Option<OtlpConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EnvFilterConfig {
    pub default_level: String,
    #[serde(default)]
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct OtlpConfig {
    pub url: String,
}

impl TryInto<EnvFilter> for EnvFilterConfig {
    type Error = anyhow::Error;

    //a bare level, directives like "sqlx=warn" belong into filters
    fn try_into(self) -> anyhow::Result<EnvFilter> {
        let default_level: LevelFilter = self
            .default_level
            .parse()
            .with_context(|| format!("Invalid default log level {}", self.default_level))?;

        EnvFilter::builder()
            .with_default_directive(default_level.into())
            .parse(self.filters.join(","))
            .context("Invalid log filter directive")
    }
}

impl MonitoringConfig {
    pub fn init(&self) -> anyhow::Result<()> {
        opentelemetry::global::set_text_map_propagator(TraceContextPropagator::default());

        let fmt_filter: EnvFilter = self.logs.clone().try_into()?;

        match &self.otlp {
            Some(otlp) => {
                let resource = self.resource();

                let logger_provider = init_logs(resource.clone(), &otlp.url)?;
                let logging_filter: EnvFilter = self.logs.clone().try_into()?;
                let logging_layer = OpenTelemetryTracingBridge::new(&logger_provider).with_filter(logging_filter);

                let tracer_provider = init_traces(resource.clone(), &otlp.url)?;
                let tracer = tracer_provider.tracer(self.app_name.to_owned());
                let tracing_filter: EnvFilter = self.traces.clone().try_into()?;
                let tracing_layer = OpenTelemetryLayer::new(tracer).with_filter(tracing_filter);

                opentelemetry::global::set_meter_provider(init_metrics(resource, &otlp.url)?);

                tracing_subscriber::registry()
                    .with(tracing_layer)
                    .with(logging_layer)
                    .with(self.fmt_layer().with_filter(fmt_filter))
                    .try_init()
                    .context("Error installing tracing subscriber")?;
            }
            None => {
                tracing_subscriber::registry()
                    .with(self.fmt_layer().with_filter(fmt_filter))
                    .try_init()
                    .context("Error installing tracing subscriber")?;
            }
        }

        Ok(())
    }

    fn resource(&self) -> Resource {
        Resource::builder()
            .with_attribute(KeyValue::new("service.name", self.service_name.clone()))
            .with_attribute(KeyValue::new("app.name", self.app_name.clone()))
            .build()
    }

    fn fmt_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        match self.format {
            LogFormat::Plain => tracing_subscriber::fmt::layer().boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        }
    }
}

fn init_traces(resource: Resource, url: &str) -> Result<SdkTracerProvider, ExporterBuildError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(url)
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

fn init_metrics(resource: Resource, url: &str) -> Result<SdkMeterProvider, ExporterBuildError> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(url)
        .build()?;
    let reader = PeriodicReader::builder(exporter)
        .with_interval(std::time::Duration::from_secs(15))
        .build();

    Ok(SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource)
        .build())
}

fn init_logs(resource: Resource, url: &str) -> Result<SdkLoggerProvider, ExporterBuildError> {
    let exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(url)
        .build()?;

    Ok(SdkLoggerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}
