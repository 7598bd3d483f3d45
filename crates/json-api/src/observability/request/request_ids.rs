//! Request ID generation and response header helpers.

use salvo::{
    http::{StatusCode, header::HeaderValue},
    prelude::Response,
};
use tracing::warn;
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upstream ids longer than this are replaced rather than echoed.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse a proxy-supplied id when it is short printable ASCII, otherwise mint one.
pub(super) fn resolve_request_id(header_value: Option<String>) -> String {
    header_value
        .map(|value| value.trim().to_owned())
        .filter(|value| {
            !value.is_empty()
                && value.len() <= MAX_REQUEST_ID_LEN
                && value.chars().all(|c| c.is_ascii_graphic())
        })
        .unwrap_or_else(|| Uuid::now_v7().to_string())
}

pub(super) fn set_request_id_header(res: &mut Response, request_id: &str) {
    match HeaderValue::from_str(request_id) {
        Ok(value) => {
            res.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        Err(source) => warn!(request_id, "could not encode request id header: {source}"),
    }
}

pub(super) fn response_status_or_ok(status_code: Option<StatusCode>) -> StatusCode {
    status_code.unwrap_or(StatusCode::OK)
}
