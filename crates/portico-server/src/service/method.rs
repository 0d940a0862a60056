//! Method operations

use portico_common::{PorticoError, PorticoResult};
use portico_persistence::{MethodInfo, MethodPersistence};

use crate::model::form::{DeleteResult, MethodForm};
use crate::service::{ConfigRepository, validator};

pub async fn find_all(
    repository: &ConfigRepository,
    resource_id: Option<&str>,
) -> PorticoResult<Vec<MethodInfo>> {
    let backend = repository.backend();
    match resource_id {
        Some(resource_id) => {
            validator::require_uuid("resourceId", resource_id)?;
            repository
                .run(
                    "method_find_by_resource",
                    backend.method_find_by_resource(resource_id),
                )
                .await
        }
        None => {
            repository
                .run("method_find_all", backend.method_find_all())
                .await
        }
    }
}

pub async fn get_by_id(repository: &ConfigRepository, id: &str) -> PorticoResult<MethodInfo> {
    validator::require_uuid("id", id)?;
    repository
        .run("method_find_by_id", repository.backend().method_find_by_id(id))
        .await?
        .ok_or_else(|| PorticoError::not_found(format!("method '{id}' does not exist")))
}

pub async fn add_or_update(
    repository: &ConfigRepository,
    form: &MethodForm,
) -> PorticoResult<MethodInfo> {
    let method = validator::validate_method(repository, form).await?;
    repository
        .run("method_upsert", repository.backend().method_upsert(method))
        .await
}

pub async fn delete(repository: &ConfigRepository, id: &str) -> PorticoResult<DeleteResult> {
    validator::require_uuid("id", id)?;
    let deleted = repository
        .run("method_delete", repository.backend().method_delete(id))
        .await?;
    Ok(DeleteResult {
        id: id.to_string(),
        deleted,
    })
}
