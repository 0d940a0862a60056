//! Authentication models
//!
//! This file defines the bearer credential payload and the auth settings

use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use serde::{Deserialize, Serialize};

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const TOKEN_PREFIX: &str = "Bearer ";
pub const DEFAULT_TOKEN_EXPIRE_SECONDS: i64 = 3600;

/// JWT payload for Portico bearer credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PorticoJwtPayload {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Immutable authentication settings built once at startup
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// When false the gate runs in demo mode and lets every request through
    pub enabled: bool,
    /// Base64 encoded HMAC secret
    pub secret_key: String,
    pub token_lifetime: Duration,
    /// Request header carrying `Bearer <token>`; the renewed token is echoed in it
    pub header: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            secret_key: String::new(),
            token_lifetime: Duration::from_secs(DEFAULT_TOKEN_EXPIRE_SECONDS as u64),
            header: AUTHORIZATION_HEADER.to_string(),
        }
    }
}

/// Why a presented credential was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Missing,
    Malformed,
    Expired,
    BadSignature,
}

impl TokenRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::Missing => "credential missing",
            TokenRejection::Malformed => "credential malformed",
            TokenRejection::Expired => "credential expired",
            TokenRejection::BadSignature => "credential signature invalid",
        }
    }
}

impl std::fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&ErrorKind> for TokenRejection {
    fn from(kind: &ErrorKind) -> Self {
        match kind {
            ErrorKind::ExpiredSignature => TokenRejection::Expired,
            ErrorKind::InvalidSignature => TokenRejection::BadSignature,
            _ => TokenRejection::Malformed,
        }
    }
}
