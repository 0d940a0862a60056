//! Portico Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all Portico components:
//! - The closed error taxonomy and error codes
//! - Identifier, path, JSON and URL predicates used by validation

pub mod error;
pub mod utils;

// Re-exports for convenience
pub use error::{ErrorCode, PorticoError, PorticoResult};
pub use utils::{
    is_valid_json, is_valid_name, is_valid_path, is_valid_url, is_valid_uuid_v4, new_id,
};
