//! Request handling helpers.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID for every inbound request
//! - Echo it back in the response and attach it to the request span
//! - Lenient parsing of optional query and path parameters

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use std::str::FromStr;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID generator producing UUID v4 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Assign a request ID unless the caller already sent one.
pub fn set_request_id_layer() -> SetRequestIdLayer<UuidRequestId> {
    SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId)
}

/// Copy the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Span for one inbound request, tagged with its ID.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Parse an optional query parameter, falling back to `default` when it is
/// missing or malformed.
pub fn param_or<T: FromStr>(value: Option<&str>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Parse a non-negative count. Digit strings too large for `u64` saturate
/// instead of failing, so callers can clamp them.
pub fn saturating_count(value: &str) -> Option<u64> {
    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_or() {
        assert_eq!(param_or(Some("50"), 20u32), 50);
        assert_eq!(param_or(Some(" 7 "), 20u32), 7);
        assert_eq!(param_or(Some("abc"), 20u32), 20);
        assert_eq!(param_or(Some("-1"), 20u32), 20);
        assert_eq!(param_or::<u32>(None, 20), 20);
    }

    #[test]
    fn test_saturating_count() {
        assert_eq!(saturating_count("20"), Some(20));
        assert_eq!(saturating_count(" 5 "), Some(5));
        assert_eq!(saturating_count("99999999999"), Some(99_999_999_999));
        assert_eq!(saturating_count("99999999999999999999999"), Some(u64::MAX));
        assert_eq!(saturating_count("-3"), None);
        assert_eq!(saturating_count("1e3"), None);
        assert_eq!(saturating_count(""), None);
    }

    #[test]
    fn test_request_ids_are_unique_uuids() {
        let request = Request::new(Body::empty());
        let mut make = UuidRequestId;
        let a = make.make_request_id(&request).unwrap();
        let b = make.make_request_id(&request).unwrap();

        let a = a.header_value().to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&a).is_ok());
        assert_ne!(a, b.header_value().to_str().unwrap());
    }
}
