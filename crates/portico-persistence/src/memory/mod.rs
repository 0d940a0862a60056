// In-memory persistence backend
// Holds all three tables behind one lock so that unique-key and reference
// checks happen in the same critical section as the write they guard.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::model::{
    HttpVerb, MethodInfo, NamespaceInfo, PersistError, PersistResult, ResourceInfo, StorageMode,
};
use crate::traits::*;

#[derive(Default)]
struct Tables {
    namespaces: Vec<NamespaceInfo>,
    resources: Vec<ResourceInfo>,
    methods: Vec<MethodInfo>,
}

/// Replace the row with a matching id in place, or append it
fn put<T: Clone>(rows: &mut Vec<T>, row: T, same_id: impl Fn(&T) -> bool) -> T {
    match rows.iter_mut().find(|r| same_id(r)) {
        Some(slot) => *slot = row.clone(),
        None => rows.push(row.clone()),
    }
    row
}

fn remove<T>(rows: &mut Vec<T>, same_id: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|r| !same_id(r));
    rows.len() != before
}

/// Process-local persistence service
///
/// Rows are enumerated in insertion order; an update keeps the row's
/// original position.
#[derive(Default)]
pub struct MemoryPersistService {
    tables: RwLock<Tables>,
}

impl MemoryPersistService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceService for MemoryPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::Memory
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl NamespacePersistence for MemoryPersistService {
    async fn namespace_find_all(&self) -> PersistResult<Vec<NamespaceInfo>> {
        Ok(self.tables.read().namespaces.clone())
    }

    async fn namespace_find_by_id(&self, id: &str) -> PersistResult<Option<NamespaceInfo>> {
        Ok(self
            .tables
            .read()
            .namespaces
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn namespace_upsert(&self, namespace: NamespaceInfo) -> PersistResult<NamespaceInfo> {
        let mut tables = self.tables.write();
        let id = namespace.id.clone();
        Ok(put(&mut tables.namespaces, namespace, |n| n.id == id))
    }

    async fn namespace_delete(&self, id: &str) -> PersistResult<bool> {
        let mut tables = self.tables.write();

        let owned = tables.resources.iter().filter(|r| r.namespace_id == id).count();
        if owned > 0 {
            return Err(PersistError::StillReferenced(format!(
                "namespace '{id}' still owns {owned} resource(s)"
            )));
        }

        Ok(remove(&mut tables.namespaces, |n| n.id == id))
    }
}

#[async_trait]
impl ResourcePersistence for MemoryPersistService {
    async fn resource_find_all(&self) -> PersistResult<Vec<ResourceInfo>> {
        Ok(self.tables.read().resources.clone())
    }

    async fn resource_find_by_id(&self, id: &str) -> PersistResult<Option<ResourceInfo>> {
        Ok(self
            .tables
            .read()
            .resources
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn resource_find_by_namespace(
        &self,
        namespace_id: &str,
    ) -> PersistResult<Vec<ResourceInfo>> {
        Ok(self
            .tables
            .read()
            .resources
            .iter()
            .filter(|r| r.namespace_id == namespace_id)
            .cloned()
            .collect())
    }

    async fn resource_count_siblings(
        &self,
        namespace_id: &str,
        parent_resource_id: Option<&str>,
        path: &str,
    ) -> PersistResult<u64> {
        let scope = parent_resource_id.unwrap_or("");
        Ok(self
            .tables
            .read()
            .resources
            .iter()
            .filter(|r| r.namespace_id == namespace_id && r.parent_scope() == scope && r.path == path)
            .count() as u64)
    }

    async fn resource_count_children(&self, id: &str) -> PersistResult<u64> {
        Ok(self
            .tables
            .read()
            .resources
            .iter()
            .filter(|r| r.parent_resource_id.as_deref() == Some(id))
            .count() as u64)
    }

    async fn resource_count_by_namespace(&self, namespace_id: &str) -> PersistResult<u64> {
        Ok(self
            .tables
            .read()
            .resources
            .iter()
            .filter(|r| r.namespace_id == namespace_id)
            .count() as u64)
    }

    async fn resource_upsert(&self, resource: ResourceInfo) -> PersistResult<ResourceInfo> {
        let mut tables = self.tables.write();

        if !tables.namespaces.iter().any(|n| n.id == resource.namespace_id) {
            return Err(PersistError::MissingReference(format!(
                "namespace '{}' does not exist",
                resource.namespace_id
            )));
        }
        if let Some(parent_id) = resource.parent_resource_id.as_deref() {
            let parent_in_namespace = tables
                .resources
                .iter()
                .any(|r| r.id == parent_id && r.namespace_id == resource.namespace_id);
            if !parent_in_namespace {
                return Err(PersistError::MissingReference(format!(
                    "parent resource '{}' does not exist in namespace '{}'",
                    parent_id, resource.namespace_id
                )));
            }
        }

        let taken = tables.resources.iter().any(|r| {
            r.id != resource.id
                && r.namespace_id == resource.namespace_id
                && r.parent_scope() == resource.parent_scope()
                && r.path == resource.path
        });
        if taken {
            return Err(PersistError::UniqueViolation(format!(
                "resource path '{}' already exists under the same parent",
                resource.path
            )));
        }

        let id = resource.id.clone();
        Ok(put(&mut tables.resources, resource, |r| r.id == id))
    }

    async fn resource_delete(&self, id: &str) -> PersistResult<bool> {
        let mut tables = self.tables.write();

        let children = tables
            .resources
            .iter()
            .filter(|r| r.parent_resource_id.as_deref() == Some(id))
            .count();
        let methods = tables.methods.iter().filter(|m| m.resource_id == id).count();
        if children > 0 || methods > 0 {
            return Err(PersistError::StillReferenced(format!(
                "resource '{id}' still has {children} child resource(s) and {methods} method(s)"
            )));
        }

        Ok(remove(&mut tables.resources, |r| r.id == id))
    }
}

#[async_trait]
impl MethodPersistence for MemoryPersistService {
    async fn method_find_all(&self) -> PersistResult<Vec<MethodInfo>> {
        Ok(self.tables.read().methods.clone())
    }

    async fn method_find_by_id(&self, id: &str) -> PersistResult<Option<MethodInfo>> {
        Ok(self
            .tables
            .read()
            .methods
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn method_find_by_resource(&self, resource_id: &str) -> PersistResult<Vec<MethodInfo>> {
        Ok(self
            .tables
            .read()
            .methods
            .iter()
            .filter(|m| m.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn method_find_by_resources(
        &self,
        resource_ids: &[String],
    ) -> PersistResult<Vec<MethodInfo>> {
        Ok(self
            .tables
            .read()
            .methods
            .iter()
            .filter(|m| resource_ids.contains(&m.resource_id))
            .cloned()
            .collect())
    }

    async fn method_count_by_resource_verb(
        &self,
        resource_id: &str,
        verb: HttpVerb,
    ) -> PersistResult<u64> {
        Ok(self
            .tables
            .read()
            .methods
            .iter()
            .filter(|m| m.resource_id == resource_id && m.verb == verb)
            .count() as u64)
    }

    async fn method_count_by_resource(&self, resource_id: &str) -> PersistResult<u64> {
        Ok(self
            .tables
            .read()
            .methods
            .iter()
            .filter(|m| m.resource_id == resource_id)
            .count() as u64)
    }

    async fn method_upsert(&self, method: MethodInfo) -> PersistResult<MethodInfo> {
        let mut tables = self.tables.write();

        if !tables.resources.iter().any(|r| r.id == method.resource_id) {
            return Err(PersistError::MissingReference(format!(
                "resource '{}' does not exist",
                method.resource_id
            )));
        }

        let taken = tables
            .methods
            .iter()
            .any(|m| m.id != method.id && m.resource_id == method.resource_id && m.verb == method.verb);
        if taken {
            return Err(PersistError::UniqueViolation(format!(
                "method {} already exists on resource '{}'",
                method.verb, method.resource_id
            )));
        }

        let id = method.id.clone();
        Ok(put(&mut tables.methods, method, |m| m.id == id))
    }

    async fn method_delete(&self, id: &str) -> PersistResult<bool> {
        Ok(remove(&mut self.tables.write().methods, |m| m.id == id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn resource(id: &str, parent: Option<&str>, path: &str) -> ResourceInfo {
        ResourceInfo {
            id: id.to_string(),
            namespace_id: "ns".to_string(),
            parent_resource_id: parent.map(str::to_string),
            path: path.to_string(),
        }
    }

    fn method(id: &str, resource_id: &str, verb: HttpVerb) -> MethodInfo {
        MethodInfo {
            id: id.to_string(),
            resource_id: resource_id.to_string(),
            verb,
            ..Default::default()
        }
    }

    /// Store holding namespace `ns` and the given root resources
    async fn store_with(roots: &[&str]) -> MemoryPersistService {
        let store = MemoryPersistService::new();
        store
            .namespace_upsert(NamespaceInfo {
                id: "ns".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        for id in roots {
            store.resource_upsert(resource(id, None, id)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_upsert_keeps_insertion_order() {
        let store = store_with(&["a", "b"]).await;
        store.resource_upsert(resource("a", None, "a2")).await.unwrap();

        let all = store.resource_find_all().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(all[0].path, "a2");
    }

    #[tokio::test]
    async fn test_sibling_path_is_unique_per_parent() {
        let store = store_with(&[]).await;
        store.resource_upsert(resource("a", None, "users")).await.unwrap();

        let dup = store.resource_upsert(resource("b", None, "users")).await;
        assert!(matches!(dup, Err(PersistError::UniqueViolation(_))));

        // same path under a different parent is fine
        store
            .resource_upsert(resource("c", Some("a"), "users"))
            .await
            .unwrap();
        assert_eq!(
            store
                .resource_count_siblings("ns", Some("a"), "users")
                .await
                .unwrap(),
            1
        );
        assert_eq!(store.resource_count_children("a").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resource_verb_is_unique() {
        let store = store_with(&["r1"]).await;
        store
            .method_upsert(method("m1", "r1", HttpVerb::Get))
            .await
            .unwrap();
        let dup = store.method_upsert(method("m2", "r1", HttpVerb::Get)).await;
        assert!(matches!(dup, Err(PersistError::UniqueViolation(_))));

        store
            .method_upsert(method("m3", "r1", HttpVerb::Post))
            .await
            .unwrap();
        // re-saving the same row is not a violation
        store
            .method_upsert(method("m1", "r1", HttpVerb::Get))
            .await
            .unwrap();
        assert_eq!(store.method_count_by_resource("r1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_methods_by_resources() {
        let store = store_with(&["r1", "r2", "r3"]).await;
        store.method_upsert(method("m1", "r1", HttpVerb::Get)).await.unwrap();
        store.method_upsert(method("m2", "r2", HttpVerb::Get)).await.unwrap();
        store.method_upsert(method("m3", "r3", HttpVerb::Get)).await.unwrap();

        let found = store
            .method_find_by_resources(&["r1".to_string(), "r3".to_string()])
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3"]);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let store = store_with(&[]).await;
        assert!(store.namespace_delete("ns").await.unwrap());
        assert!(!store.namespace_delete("ns").await.unwrap());
    }

    #[tokio::test]
    async fn test_writes_need_existing_references() {
        let store = MemoryPersistService::new();
        let orphan = store.resource_upsert(resource("a", None, "a")).await;
        assert!(matches!(orphan, Err(PersistError::MissingReference(_))));

        let store = store_with(&["a"]).await;
        let orphan = store.resource_upsert(resource("b", Some("ghost"), "b")).await;
        assert!(matches!(orphan, Err(PersistError::MissingReference(_))));

        let orphan = store.method_upsert(method("m1", "ghost", HttpVerb::Get)).await;
        assert!(matches!(orphan, Err(PersistError::MissingReference(_))));
        assert_eq!(store.resource_find_all().await.unwrap().len(), 1);
        assert!(store.method_find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parent_in_other_namespace_is_a_missing_reference() {
        let store = store_with(&["a"]).await;
        store
            .namespace_upsert(NamespaceInfo {
                id: "other".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut child = resource("b", Some("a"), "b");
        child.namespace_id = "other".to_string();
        let result = store.resource_upsert(child).await;
        assert!(matches!(result, Err(PersistError::MissingReference(_))));
    }

    #[tokio::test]
    async fn test_delete_refuses_rows_with_dependents() {
        let store = store_with(&["a"]).await;
        store
            .resource_upsert(resource("b", Some("a"), "b"))
            .await
            .unwrap();
        store.method_upsert(method("m1", "b", HttpVerb::Get)).await.unwrap();

        let result = store.namespace_delete("ns").await;
        assert!(matches!(result, Err(PersistError::StillReferenced(_))));
        let result = store.resource_delete("a").await;
        assert!(matches!(result, Err(PersistError::StillReferenced(_))));
        let result = store.resource_delete("b").await;
        assert!(matches!(result, Err(PersistError::StillReferenced(_))));

        assert!(store.method_delete("m1").await.unwrap());
        assert!(store.resource_delete("b").await.unwrap());
        assert!(store.resource_delete("a").await.unwrap());
        assert!(store.namespace_delete("ns").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_leave_one_row() {
        let store = Arc::new(store_with(&[]).await);
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .resource_upsert(resource(&format!("r{i}"), None, "users"))
                    .await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.resource_count_by_namespace("ns").await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_delete_and_child_create_never_orphan() {
        for round in 0..50 {
            let store = Arc::new(store_with(&["p"]).await);

            let creator = {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .resource_upsert(resource(&format!("c{round}"), Some("p"), "child"))
                        .await
                })
            };
            let deleter = {
                let store = store.clone();
                tokio::spawn(async move { store.resource_delete("p").await })
            };
            let created = creator.await.unwrap();
            let deleted = deleter.await.unwrap();

            // exactly one side wins
            match (created, deleted) {
                (Ok(_), Err(PersistError::StillReferenced(_))) => {}
                (Err(PersistError::MissingReference(_)), Ok(true)) => {}
                other => panic!("unexpected outcome: {other:?}"),
            }
            for r in store.resource_find_all().await.unwrap() {
                if let Some(parent) = r.parent_resource_id {
                    assert!(store.resource_find_by_id(&parent).await.unwrap().is_some());
                }
            }
        }
    }
}
