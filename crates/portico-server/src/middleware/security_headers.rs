// Static response hardening applied to every response, errors included

use actix_web::{http::header, middleware::DefaultHeaders};

pub const HSTS_POLICY: &str = "max-age=15552000; includeSubDomains";
pub const CSP_POLICY: &str = "default-src 'self'";

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "DENY"))
        .add((header::STRICT_TRANSPORT_SECURITY, HSTS_POLICY))
        .add((header::CONTENT_SECURITY_POLICY, CSP_POLICY))
        .add((header::REFERRER_POLICY, "no-referrer"))
}
