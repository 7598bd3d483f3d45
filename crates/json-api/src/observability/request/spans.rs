//! HTTP span helpers.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = route_template(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Route parameter named after the collection a UUID segment follows.
fn parameter_for(collection: &str) -> &'static str {
    match collection {
        "products" => "{product}",
        "categories" => "{category}",
        "coupons" => "{coupon}",
        "sessions" => "{session}",
        "orders" => "{order}",
        _ => "{uuid}",
    }
}

/// Collapse identifiers so metrics and span names stay low-cardinality.
fn route_template(path: &str) -> String {
    let segments = path.split('/').filter(|segment| !segment.is_empty());

    let mut template = String::new();
    let mut previous = "";

    for segment in segments {
        template.push('/');

        if Uuid::parse_str(segment).is_ok() {
            template.push_str(parameter_for(previous));
        } else {
            template.push_str(segment);
        }

        previous = segment;
    }

    if template.is_empty() {
        template.push('/');
    }

    template
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_become_route_parameters() {
        let uuid = Uuid::now_v7();

        assert_eq!(
            route_template(&format!("/admin/orders/{uuid}/courier")),
            "/admin/orders/{order}/courier"
        );
        assert_eq!(
            route_template(&format!("/tracking/sessions/{uuid}/beacon")),
            "/tracking/sessions/{session}/beacon"
        );
        assert_eq!(route_template(&format!("/things/{uuid}")), "/things/{uuid}");
    }

    #[test]
    fn root_and_static_paths_are_kept() {
        assert_eq!(route_template("/"), "/");
        assert_eq!(route_template("/orders/track"), "/orders/track");
    }

    #[test]
    fn span_name_joins_method_and_template() {
        let names = request_span_name("POST", "/coupons/validate");

        assert_eq!(names.otel_span_name, "POST /coupons/validate");
    }
}
