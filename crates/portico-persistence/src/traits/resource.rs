//! Resource persistence trait

use async_trait::async_trait;

use crate::model::{PersistResult, ResourceInfo};

#[async_trait]
pub trait ResourcePersistence: Send + Sync {
    async fn resource_find_all(&self) -> PersistResult<Vec<ResourceInfo>>;

    async fn resource_find_by_id(&self, id: &str) -> PersistResult<Option<ResourceInfo>>;

    /// All resources of a namespace, in creation order
    async fn resource_find_by_namespace(
        &self,
        namespace_id: &str,
    ) -> PersistResult<Vec<ResourceInfo>>;

    /// Count resources sharing the `(namespace, parent, path)` key
    async fn resource_count_siblings(
        &self,
        namespace_id: &str,
        parent_resource_id: Option<&str>,
        path: &str,
    ) -> PersistResult<u64>;

    async fn resource_count_children(&self, id: &str) -> PersistResult<u64>;

    async fn resource_count_by_namespace(&self, namespace_id: &str) -> PersistResult<u64>;

    /// Insert, or replace the row with the same id.
    ///
    /// Fails with `UniqueViolation` when another row already holds the
    /// `(namespace, parent, path)` key.
    async fn resource_upsert(&self, resource: ResourceInfo) -> PersistResult<ResourceInfo>;

    async fn resource_delete(&self, id: &str) -> PersistResult<bool>;
}
