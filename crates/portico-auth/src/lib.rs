//! Portico Auth - Bearer credential handling
//!
//! This crate provides:
//! - The signed claims carried by a bearer credential
//! - `TokenService`: issue, verify and rotate credentials against a shared secret

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::*;
pub use service::auth::TokenService;
