//! Prometheus metrics collection and exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder, core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const REQUEST_DURATION_BUCKETS: [f64; 13] = [
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    coupon_validations_total: IntCounterVec,
    session_terminals_total: IntCounterVec,
    orders_placed_total: IntCounter,
    storefront_events_total: IntCounterVec,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        if let Some(metrics) = metrics() {
            metrics.requests_in_flight.inc();

            return Self { tracked: true };
        }

        Self { tracked: false }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_class = status_class(status_code);
    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class, status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a coupon validation by outcome, e.g. `applicable` or `expired`.
pub(crate) fn record_coupon_validation(outcome: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .coupon_validations_total
            .with_label_values(&[outcome])
            .inc();
    }
}

/// Count a checkout session terminal transition by action.
pub(crate) fn record_session_terminal(action: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .session_terminals_total
            .with_label_values(&[action])
            .inc();
    }
}

pub(crate) fn record_order_placed() {
    if let Some(metrics) = metrics() {
        metrics.orders_placed_total.inc();
    }
}

/// Count a recorded storefront event, `product_view` or `cart_add`.
pub(crate) fn record_storefront_event(event: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .storefront_events_total
            .with_label_values(&[event])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metric_families, &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    let content_type = match HeaderValue::from_str(encoder.format_type()) {
        Ok(value) => value,
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            return;
        }
    };

    res.headers_mut().insert(CONTENT_TYPE, content_type);
    res.render(String::from_utf8_lossy(&encoded).into_owned());
}

fn metrics() -> Option<&'static Metrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

fn build_metrics() -> Option<Metrics> {
    match try_build_metrics() {
        Ok(metrics) => Some(metrics),
        Err(source) => {
            error!("failed to build metrics registry: {source}");

            None
        }
    }
}

fn register<C>(registry: &Registry, collector: C) -> Result<C, prometheus::Error>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;

    Ok(collector)
}

fn try_build_metrics() -> Result<Metrics, prometheus::Error> {
    let registry = Registry::new();

    let requests_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "grocer_json_http_requests_total",
                "Total HTTP requests partitioned by method, route, status class, and status code.",
            ),
            &["method", "route", "status_class", "status_code"],
        )?,
    )?;

    let request_duration_seconds = register(
        &registry,
        HistogramVec::new(
            HistogramOpts::new(
                "grocer_json_http_request_duration_seconds",
                "HTTP request duration in seconds partitioned by method and route.",
            )
            .buckets(REQUEST_DURATION_BUCKETS.to_vec()),
            &["method", "route"],
        )?,
    )?;

    let requests_in_flight = register(
        &registry,
        IntGauge::with_opts(Opts::new(
            "grocer_json_http_requests_in_flight",
            "Current number of in-flight HTTP requests.",
        ))?,
    )?;

    let coupon_validations_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "grocer_coupon_validations_total",
                "Coupon code validations partitioned by outcome.",
            ),
            &["outcome"],
        )?,
    )?;

    let session_terminals_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "grocer_checkout_session_terminals_total",
                "Checkout session terminal transitions partitioned by action.",
            ),
            &["action"],
        )?,
    )?;

    let orders_placed_total = register(
        &registry,
        IntCounter::with_opts(Opts::new(
            "grocer_orders_placed_total",
            "Orders accepted and stored.",
        ))?,
    )?;

    let storefront_events_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "grocer_storefront_events_total",
                "Product views and cart adds recorded for analytics.",
            ),
            &["event"],
        )?,
    )?;

    Ok(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        coupon_validations_total,
        session_terminals_total,
        orders_placed_total,
        storefront_events_total,
    })
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };

    use super::*;

    #[tokio::test]
    async fn metrics_endpoint_exposes_http_and_domain_metrics() {
        observe_request("GET", "/products/{uuid}", 200, 0.042);
        observe_request("POST", "/orders", 500, 0.123);
        record_coupon_validation("applicable");
        record_session_terminal("end");
        record_order_placed();
        record_storefront_event("product_view");

        let service =
            Service::new(Router::new().push(Router::with_path("metrics").get(metrics_handler)));

        let response = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await
            .unwrap_or_default();

        for name in [
            "grocer_json_http_requests_total",
            "grocer_json_http_request_duration_seconds",
            "grocer_json_http_requests_in_flight",
            "grocer_coupon_validations_total",
            "grocer_checkout_session_terminals_total",
            "grocer_orders_placed_total",
            "grocer_storefront_events_total",
        ] {
            assert!(response.contains(name), "expected {name} in metrics response");
        }
    }

    #[test]
    fn status_codes_group_by_class() {
        assert_eq!(status_class(202), "2xx");
        assert_eq!(status_class(409), "4xx");
        assert_eq!(status_class(503), "5xx");
        assert_eq!(status_class(42), "other");
    }
}
