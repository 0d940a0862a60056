// Middleware modules for Actix-web
// Provides authentication, traffic shaping and response hardening

pub mod auth;
pub mod rate_limit;
pub mod security_headers;
