//! Namespace persistence trait

use async_trait::async_trait;

use crate::model::{NamespaceInfo, PersistResult};

#[async_trait]
pub trait NamespacePersistence: Send + Sync {
    async fn namespace_find_all(&self) -> PersistResult<Vec<NamespaceInfo>>;

    async fn namespace_find_by_id(&self, id: &str) -> PersistResult<Option<NamespaceInfo>>;

    /// Insert, or replace the row with the same id
    async fn namespace_upsert(&self, namespace: NamespaceInfo) -> PersistResult<NamespaceInfo>;

    /// Returns whether a row was removed
    async fn namespace_delete(&self, id: &str) -> PersistResult<bool>;
}
