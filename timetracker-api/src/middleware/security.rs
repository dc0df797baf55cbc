/// Security response headers
///
/// Every response gets `nosniff`, frame denial, a strict referrer policy and
/// a restrictive CSP. HSTS is added only when `api.production` is set, since
/// it is meaningless without TLS in front of the server.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::Response,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'";
const PERMISSIONS_POLICY: &str = "geolocation=(), microphone=(), camera=(), payment=(), usb=()";
const HSTS: &str = "max-age=31536000; includeSubDomains";

/// Response mapper; the state flag enables HSTS
pub async fn security_headers(State(production): State<bool>, mut response: Response) -> Response {
    let headers = response.headers_mut();

    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert("permissions-policy", HeaderValue::from_static(PERMISSIONS_POLICY));

    if production {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
    }

    response
}
