//! Persistence traits for the routing configuration store
//!
//! These traits abstract over the storage backends: an external database
//! (MySQL/PostgreSQL) and the in-process memory store. Every backend enforces
//! the sibling-path and resource-verb unique keys at write time, which is the
//! authoritative conflict signal under concurrent writes.

pub mod method;
pub mod namespace;
pub mod resource;

pub use method::MethodPersistence;
pub use namespace::NamespacePersistence;
pub use resource::ResourcePersistence;

use async_trait::async_trait;

use crate::model::StorageMode;

/// Unified persistence service trait
#[async_trait]
pub trait PersistenceService:
    NamespacePersistence + ResourcePersistence + MethodPersistence + Send + Sync
{
    /// Get the current storage mode
    fn storage_mode(&self) -> StorageMode;

    /// Health check for the storage backend
    async fn health_check(&self) -> anyhow::Result<()>;
}
