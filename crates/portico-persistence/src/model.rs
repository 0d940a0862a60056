//! Domain record types stored by every persistence backend

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use portico_common::PorticoError;
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};

/// Storage backend selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageMode {
    /// External database (MySQL/PostgreSQL via SeaORM)
    ExternalDb,
    /// In-process tables, lost on restart
    #[default]
    Memory,
}

impl Display for StorageMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::ExternalDb => write!(f, "external_db"),
            StorageMode::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "external_db" => Ok(StorageMode::ExternalDb),
            "memory" => Ok(StorageMode::Memory),
            _ => Err(format!("Invalid storage mode: {}", s)),
        }
    }
}

/// Failure reported by a storage backend
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    /// A storage-level unique key rejected the write
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The write points at a namespace or resource that does not exist
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// The row to delete still has dependents
    #[error("still referenced: {0}")]
    StillReferenced(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type PersistResult<T> = Result<T, PersistError>;

impl From<DbErr> for PersistError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                PersistError::UniqueViolation(message)
            }
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                PersistError::MissingReference(message)
            }
            _ => PersistError::Backend(anyhow::Error::new(err)),
        }
    }
}

impl From<PersistError> for PorticoError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::UniqueViolation(message) => PorticoError::Conflict(message),
            PersistError::MissingReference(message) => PorticoError::NotFound(message),
            PersistError::StillReferenced(message) => PorticoError::Conflict(message),
            PersistError::Backend(e) => PorticoError::Internal(e.to_string()),
        }
    }
}

/// Top-level grouping for a set of routable resources
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A node in the routing path tree
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    pub id: String,
    pub namespace_id: String,
    pub parent_resource_id: Option<String>,
    pub path: String,
}

impl ResourceInfo {
    /// Sibling scope used by the `(namespace, parent, path)` unique key.
    ///
    /// Root resources share the empty scope so they are constrained too.
    pub fn parent_scope(&self) -> &str {
        self.parent_resource_id.as_deref().unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.parent_resource_id.is_none()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Any,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::Any => "ANY",
        }
    }
}

impl Display for HttpVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            "PUT" => Ok(HttpVerb::Put),
            "DELETE" => Ok(HttpVerb::Delete),
            "PATCH" => Ok(HttpVerb::Patch),
            "HEAD" => Ok(HttpVerb::Head),
            "OPTIONS" => Ok(HttpVerb::Options),
            "ANY" => Ok(HttpVerb::Any),
            _ => Err(format!("Invalid HTTP verb: {}", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegrationType {
    #[default]
    Http,
    Mock,
}

impl IntegrationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationType::Http => "HTTP",
            IntegrationType::Mock => "MOCK",
        }
    }
}

impl Display for IntegrationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IntegrationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HTTP" => Ok(IntegrationType::Http),
            "MOCK" => Ok(IntegrationType::Mock),
            _ => Err(format!("Invalid integration type: {}", s)),
        }
    }
}

/// A single HTTP-verb handler attached to a resource
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub id: String,
    pub resource_id: String,
    pub verb: HttpVerb,
    pub auth_type: String,
    pub content_type: String,
    pub deny_upload: bool,
    pub rate_limit: Option<i32>,
    pub integration_type: IntegrationType,
    pub forwarded_method: HttpVerb,
    pub endpoint_url: String,
    pub endpoint_protocol: String,
    pub content_handling: String,
    pub timeout_ms: i64,
    pub mock_response_body: Option<String>,
    pub mock_response_code: i32,
    pub mock_response_content: String,
    pub active: bool,
}
