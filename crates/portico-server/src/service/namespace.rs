//! Namespace operations

use portico_common::{PorticoError, PorticoResult};
use portico_persistence::{NamespaceInfo, NamespacePersistence, ResourcePersistence};

use crate::model::form::{DeleteResult, NamespaceForm};
use crate::service::{ConfigRepository, validator};

pub async fn find_all(repository: &ConfigRepository) -> PorticoResult<Vec<NamespaceInfo>> {
    repository
        .run("namespace_find_all", repository.backend().namespace_find_all())
        .await
}

pub async fn get_by_id(repository: &ConfigRepository, id: &str) -> PorticoResult<NamespaceInfo> {
    validator::require_uuid("id", id)?;
    repository
        .run("namespace_find_by_id", repository.backend().namespace_find_by_id(id))
        .await?
        .ok_or_else(|| PorticoError::not_found(format!("namespace '{id}' does not exist")))
}

pub async fn add_or_update(
    repository: &ConfigRepository,
    form: &NamespaceForm,
) -> PorticoResult<NamespaceInfo> {
    let namespace = validator::validate_namespace(form)?;
    repository
        .run("namespace_upsert", repository.backend().namespace_upsert(namespace))
        .await
}

/// Delete a namespace that no longer owns any resources
///
/// The backend repeats the ownership check atomically with the delete.
pub async fn delete(repository: &ConfigRepository, id: &str) -> PorticoResult<DeleteResult> {
    validator::require_uuid("id", id)?;
    let backend = repository.backend();

    let resources = repository
        .run("resource_count_by_namespace", backend.resource_count_by_namespace(id))
        .await?;
    if resources > 0 {
        return Err(PorticoError::conflict(format!(
            "namespace '{id}' still owns {resources} resource(s)"
        )));
    }

    let deleted = repository
        .run("namespace_delete", backend.namespace_delete(id))
        .await?;
    Ok(DeleteResult {
        id: id.to_string(),
        deleted,
    })
}
