//! Portico Persistence - Routing configuration storage
//!
//! This crate provides:
//! - SeaORM entity definitions for namespaces, resources and methods
//! - Persistence trait abstractions shared by every backend
//! - Domain record types returned to the server
//! - An external database backend and an in-memory backend

pub mod entity;
pub mod memory;
pub mod model;
pub mod sql;
pub mod traits;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export persistence traits
pub use traits::{MethodPersistence, NamespacePersistence, PersistenceService, ResourcePersistence};

// Re-export backends
pub use memory::MemoryPersistService;
pub use sql::ExternalDbPersistService;

// Re-export model types
pub use model::{
    HttpVerb, IntegrationType, MethodInfo, NamespaceInfo, PersistError, PersistResult,
    ResourceInfo, StorageMode,
};
