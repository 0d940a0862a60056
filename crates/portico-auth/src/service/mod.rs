//! Authentication service implementations

pub mod auth;
