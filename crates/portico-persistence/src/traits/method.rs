//! Method persistence trait

use async_trait::async_trait;

use crate::model::{HttpVerb, MethodInfo, PersistResult};

#[async_trait]
pub trait MethodPersistence: Send + Sync {
    async fn method_find_all(&self) -> PersistResult<Vec<MethodInfo>>;

    async fn method_find_by_id(&self, id: &str) -> PersistResult<Option<MethodInfo>>;

    async fn method_find_by_resource(&self, resource_id: &str) -> PersistResult<Vec<MethodInfo>>;

    /// Methods of any of the given resources, in creation order
    async fn method_find_by_resources(
        &self,
        resource_ids: &[String],
    ) -> PersistResult<Vec<MethodInfo>>;

    async fn method_count_by_resource_verb(
        &self,
        resource_id: &str,
        verb: HttpVerb,
    ) -> PersistResult<u64>;

    async fn method_count_by_resource(&self, resource_id: &str) -> PersistResult<u64>;

    /// Insert, or replace the row with the same id.
    ///
    /// Fails with `UniqueViolation` when another row already holds the
    /// `(resource, verb)` key.
    async fn method_upsert(&self, method: MethodInfo) -> PersistResult<MethodInfo>;

    async fn method_delete(&self, id: &str) -> PersistResult<bool>;
}
