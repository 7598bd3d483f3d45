//! Parent trace context extraction from HTTP headers.

use opentelemetry::{Context, global, propagation::Extractor, trace::TraceContextExt as _};
use salvo::http::{HeaderMap, HeaderName};

/// Remote parent named by `traceparent`, if the header carries a valid one.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    let context = global::get_text_map_propagator(|propagator| {
        propagator.extract_with_context(&Context::new(), &Headers(headers))
    });

    context.span().span_context().is_valid().then_some(context)
}

#[derive(Debug)]
struct Headers<'a>(&'a HeaderMap);

impl Extractor for Headers<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}
