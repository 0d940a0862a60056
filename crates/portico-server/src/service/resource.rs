//! Resource operations, including the per-namespace routing tree

use std::collections::HashMap;

use portico_common::{PorticoError, PorticoResult};
use portico_persistence::{
    MethodInfo, MethodPersistence, NamespacePersistence, ResourceInfo, ResourcePersistence,
};

use crate::model::form::{DeleteResult, ResourceForm};
use crate::service::{
    ConfigRepository,
    tree::{self, ResourceNode, ResourceWithMethods},
    validator,
};

pub async fn find_all(
    repository: &ConfigRepository,
    namespace_id: Option<&str>,
) -> PorticoResult<Vec<ResourceInfo>> {
    let backend = repository.backend();
    match namespace_id {
        Some(namespace_id) => {
            validator::require_uuid("namespaceId", namespace_id)?;
            repository
                .run(
                    "resource_find_by_namespace",
                    backend.resource_find_by_namespace(namespace_id),
                )
                .await
        }
        None => {
            repository
                .run("resource_find_all", backend.resource_find_all())
                .await
        }
    }
}

pub async fn get_by_id(repository: &ConfigRepository, id: &str) -> PorticoResult<ResourceInfo> {
    validator::require_uuid("id", id)?;
    repository
        .run("resource_find_by_id", repository.backend().resource_find_by_id(id))
        .await?
        .ok_or_else(|| PorticoError::not_found(format!("resource '{id}' does not exist")))
}

pub async fn add_or_update(
    repository: &ConfigRepository,
    form: &ResourceForm,
) -> PorticoResult<ResourceInfo> {
    let resource = validator::validate_resource(repository, form).await?;
    repository
        .run("resource_upsert", repository.backend().resource_upsert(resource))
        .await
}

/// Delete a resource with no child resources and no methods
///
/// The backend repeats the dependents check atomically with the delete.
pub async fn delete(repository: &ConfigRepository, id: &str) -> PorticoResult<DeleteResult> {
    validator::require_uuid("id", id)?;
    let backend = repository.backend();

    let children = repository
        .run("resource_count_children", backend.resource_count_children(id))
        .await?;
    let methods = repository
        .run("method_count_by_resource", backend.method_count_by_resource(id))
        .await?;
    if children > 0 || methods > 0 {
        return Err(PorticoError::conflict(format!(
            "resource '{id}' still has {children} child resource(s) and {methods} method(s)"
        )));
    }

    let deleted = repository
        .run("resource_delete", backend.resource_delete(id))
        .await?;
    Ok(DeleteResult {
        id: id.to_string(),
        deleted,
    })
}

pub async fn get_methods(repository: &ConfigRepository, id: &str) -> PorticoResult<Vec<MethodInfo>> {
    let resource = get_by_id(repository, id).await?;
    repository
        .run(
            "method_find_by_resource",
            repository.backend().method_find_by_resource(&resource.id),
        )
        .await
}

/// Load a namespace's full resource set with methods and nest it
pub async fn get_tree_by_namespace(
    repository: &ConfigRepository,
    namespace_id: &str,
) -> PorticoResult<Vec<ResourceNode>> {
    validator::require_uuid("namespaceId", namespace_id)?;
    let backend = repository.backend();

    if repository
        .run(
            "namespace_find_by_id",
            backend.namespace_find_by_id(namespace_id),
        )
        .await?
        .is_none()
    {
        return Err(PorticoError::not_found(format!(
            "namespace '{namespace_id}' does not exist"
        )));
    }

    let resources = repository
        .run(
            "resource_find_by_namespace",
            backend.resource_find_by_namespace(namespace_id),
        )
        .await?;
    let resource_ids: Vec<String> = resources.iter().map(|r| r.id.clone()).collect();
    let methods = repository
        .run(
            "method_find_by_resources",
            backend.method_find_by_resources(&resource_ids),
        )
        .await?;

    let mut methods_by_resource: HashMap<String, Vec<MethodInfo>> = HashMap::new();
    for method in methods {
        methods_by_resource
            .entry(method.resource_id.clone())
            .or_default()
            .push(method);
    }

    let records = resources
        .into_iter()
        .map(|resource| ResourceWithMethods {
            methods: methods_by_resource.remove(&resource.id).unwrap_or_default(),
            resource,
        })
        .collect();

    tree::build_resource_tree(records)
}
