//! Error types and error codes for Portico
//!
//! This module defines:
//! - `PorticoError`: the closed set of failure kinds every operation reports
//! - `ErrorCode`: structured error codes carried in API error envelopes

use serde::{Deserialize, Serialize};

/// Application-specific error types
///
/// Each variant maps to exactly one HTTP status code and one error code, so
/// callers never need to inspect an error's message to decide how to answer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PorticoError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type PorticoResult<T> = Result<T, PorticoError>;

impl PorticoError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        PorticoError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        PorticoError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PorticoError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PorticoError::Internal(message.into())
    }

    /// HTTP status code used when this error reaches the handler boundary
    pub fn status(&self) -> u16 {
        match self {
            PorticoError::InvalidInput(_) => 409,
            PorticoError::NotFound(_) => 404,
            PorticoError::Conflict(_) => 409,
            PorticoError::Unauthorized(_) => 401,
            PorticoError::Timeout(_) => 504,
            PorticoError::Integrity(_) => 500,
            PorticoError::Internal(_) => 500,
        }
    }

    pub fn error_code(&self) -> ErrorCode<'static> {
        match self {
            PorticoError::InvalidInput(_) => PARAMETER_VALIDATE_ERROR,
            PorticoError::NotFound(_) => RESOURCE_NOT_FOUND,
            PorticoError::Conflict(_) => RESOURCE_CONFLICT,
            PorticoError::Unauthorized(_) => ACCESS_DENIED,
            PorticoError::Timeout(_) => STORAGE_TIMEOUT,
            PorticoError::Integrity(_) => DATA_INTEGRITY_ERROR,
            PorticoError::Internal(_) => SERVER_ERROR,
        }
    }

    /// Short machine-readable kind name, used in structured log events
    pub fn kind(&self) -> &'static str {
        match self {
            PorticoError::InvalidInput(_) => "InvalidInput",
            PorticoError::NotFound(_) => "NotFound",
            PorticoError::Conflict(_) => "Conflict",
            PorticoError::Unauthorized(_) => "Unauthorized",
            PorticoError::Timeout(_) => "Timeout",
            PorticoError::Integrity(_) => "IntegrityError",
            PorticoError::Internal(_) => "Internal",
        }
    }
}

impl From<anyhow::Error> for PorticoError {
    fn from(value: anyhow::Error) -> Self {
        PorticoError::Internal(value.to_string())
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const ACCESS_DENIED: ErrorCode<'static> = ErrorCode {
    code: 10001,
    message: "access denied",
};

pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "data access error",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource not found",
};

pub const RESOURCE_CONFLICT: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "resource conflict",
};

pub const STORAGE_TIMEOUT: ErrorCode<'static> = ErrorCode {
    code: 20006,
    message: "storage timeout",
};

pub const DATA_INTEGRITY_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20007,
    message: "data integrity error",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};
