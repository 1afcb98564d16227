//! Header filtering for both legs of a forwarded request.
//!
//! Outbound: only a fixed allow-list of client headers reaches the upstream.
//! Inbound: everything the upstream sent except framing headers, which the
//! proxying layer invalidates, followed by forced cache-busting headers.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::http::X_REQUEST_ID;

/// Client headers forwarded to the upstream.
pub const FORWARDED_REQUEST_HEADERS: [HeaderName; 4] = [
    header::CONTENT_TYPE,
    header::ACCEPT,
    header::USER_AGENT,
    HeaderName::from_static(X_REQUEST_ID),
];

/// Upstream headers that never reach the client.
pub const FRAMING_HEADERS: [HeaderName; 3] = [
    header::TRANSFER_ENCODING,
    header::CONTENT_ENCODING,
    header::CONTENT_LENGTH,
];

pub const CACHE_CONTROL_VALUE: &str = "no-cache, no-store, must-revalidate";
pub const PRAGMA_VALUE: &str = "no-cache";
pub const EXPIRES_VALUE: &str = "0";

/// Select the allow-listed headers from an inbound request.
pub fn forwarded_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for name in FORWARDED_REQUEST_HEADERS.iter() {
        for value in inbound.get_all(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

/// Copy upstream response headers minus framing headers, then force no-cache.
pub fn relay_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(upstream.len() + 3);
    for (name, value) in upstream.iter() {
        if FRAMING_HEADERS.contains(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    apply_no_cache(&mut out);
    out
}

/// Overwrite the three cache-busting headers.
pub fn apply_no_cache(headers: &mut HeaderMap) {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE));
    headers.insert(header::PRAGMA, HeaderValue::from_static(PRAGMA_VALUE));
    headers.insert(header::EXPIRES, HeaderValue::from_static(EXPIRES_VALUE));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (k, v) in pairs {
            headers.append(HeaderName::from_static(k), HeaderValue::from_static(v));
        }
        headers
    }

    #[test]
    fn test_request_allow_list() {
        let inbound = map(&[
            ("content-type", "application/json"),
            ("accept", "application/json"),
            ("user-agent", "dashboard/1.0"),
            ("x-request-id", "abc-123"),
            ("authorization", "Bearer token"),
            ("cookie", "session=1"),
            ("host", "admin.local"),
        ]);

        let out = forwarded_request_headers(&inbound);
        assert_eq!(out.len(), 4);
        assert_eq!(out["x-request-id"], "abc-123");
        assert!(out.get(header::AUTHORIZATION).is_none());
        assert!(out.get(header::COOKIE).is_none());
        assert!(out.get(header::HOST).is_none());
    }

    #[test]
    fn test_framing_headers_stripped() {
        let upstream = map(&[
            ("transfer-encoding", "chunked"),
            ("content-encoding", "gzip"),
            ("content-length", "42"),
            ("content-type", "application/json"),
            ("set-cookie", "a=1"),
            ("set-cookie", "b=2"),
        ]);

        let out = relay_response_headers(&upstream);
        for name in FRAMING_HEADERS.iter() {
            assert!(out.get(name).is_none(), "{name} leaked");
        }
        assert_eq!(out["content-type"], "application/json");
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn test_cache_headers_override_upstream() {
        let upstream = map(&[
            ("cache-control", "public, max-age=3600"),
            ("pragma", "cache"),
            ("expires", "Thu, 01 Dec 2994 16:00:00 GMT"),
        ]);

        let out = relay_response_headers(&upstream);
        assert_eq!(out[header::CACHE_CONTROL], CACHE_CONTROL_VALUE);
        assert_eq!(out[header::PRAGMA], PRAGMA_VALUE);
        assert_eq!(out[header::EXPIRES], EXPIRES_VALUE);
        assert_eq!(out.get_all(header::CACHE_CONTROL).iter().count(), 1);
    }

    #[test]
    fn test_cache_headers_added_when_absent() {
        let out = relay_response_headers(&HeaderMap::new());
        assert_eq!(out.len(), 3);
    }
}
