//! OpenTelemetry tracer provider setup.

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};

use crate::config::observability::ObservabilityConfig;

use super::ObservabilityError;

const SERVICE_NAMESPACE: &str = "grocer";

pub(super) fn build_tracer_provider(
    config: &ObservabilityConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otel_exporter_otlp_endpoint.clone())
        .with_timeout(Duration::from_secs(config.otel_exporter_otlp_timeout_seconds))
        .build()?;

    let sampler = Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
        config.otel_trace_sample_ratio.clamp(0.0, 1.0),
    )));

    Ok(SdkTracerProvider::builder()
        .with_sampler(sampler)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(service_resource(config))
        .with_batch_exporter(exporter)
        .build())
}

fn service_resource(config: &ObservabilityConfig) -> Resource {
    Resource::builder_empty()
        .with_service_name(config.otel_service_name.clone())
        .with_attributes([
            KeyValue::new("service.namespace", SERVICE_NAMESPACE),
            KeyValue::new("service.version", config.otel_service_version.clone()),
            KeyValue::new(
                "deployment.environment.name",
                config.otel_deployment_environment.clone(),
            ),
        ])
        .build()
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use opentelemetry::{Key, Value};

    use super::*;

    #[derive(Debug, Parser)]
    struct Args {
        #[command(flatten)]
        observability: ObservabilityConfig,
    }

    #[test]
    fn resource_names_the_storefront_service() {
        let args = Args::parse_from(["grocer-json", "--otel-deployment-environment=staging"]);
        let resource = service_resource(&args.observability);

        assert_eq!(
            resource.get(&Key::from_static_str("service.name")),
            Some(Value::from("grocer-json"))
        );
        assert_eq!(
            resource.get(&Key::from_static_str("service.namespace")),
            Some(Value::from(SERVICE_NAMESPACE))
        );
        assert_eq!(
            resource.get(&Key::from_static_str("deployment.environment.name")),
            Some(Value::from("staging"))
        );
    }
}
