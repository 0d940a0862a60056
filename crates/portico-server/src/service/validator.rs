//! Write-path validation
//!
//! Each `validate_*` function checks one incoming form against the rules for
//! its entity and returns the normalized record ready to be upserted:
//! identifier format first, then domain rules, then foreign-key existence,
//! then (create path only) the uniqueness pre-check. The pre-checks only
//! produce a friendlier early error; the storage unique keys and reference
//! checks are what actually decide a concurrent race.

use portico_common::{
    PorticoError, PorticoResult, is_valid_json, is_valid_name, is_valid_path, is_valid_url,
    is_valid_uuid_v4, new_id,
};
use portico_persistence::{
    IntegrationType, MethodInfo, MethodPersistence, NamespaceInfo, NamespacePersistence,
    ResourceInfo, ResourcePersistence,
};

use crate::model::form::{MethodForm, NamespaceForm, ResourceForm};
use crate::service::{ConfigRepository, tree::MAX_RESOURCE_DEPTH};

pub const DEFAULT_AUTH_TYPE: &str = "NONE";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_ENDPOINT_PROTOCOL: &str = "HTTP/1.1";
pub const DEFAULT_CONTENT_HANDLING: &str = "PASSTHROUGH";
pub const DEFAULT_TIMEOUT_MS: i64 = 29000;
pub const DEFAULT_MOCK_RESPONSE_BODY: &str = "{}";
pub const DEFAULT_MOCK_RESPONSE_CODE: i32 = 200;

pub fn require_uuid(field: &str, value: &str) -> PorticoResult<()> {
    if is_valid_uuid_v4(value) {
        Ok(())
    } else {
        Err(PorticoError::invalid_input(format!(
            "{field} '{value}' is not a valid UUIDv4"
        )))
    }
}

/// Treat `Some("")` and `Some("  ")` as absent
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn validate_namespace(form: &NamespaceForm) -> PorticoResult<NamespaceInfo> {
    let id = match present(&form.id) {
        Some(id) => {
            require_uuid("id", id)?;
            id.to_string()
        }
        None => new_id(),
    };

    let name = form.name.as_deref().unwrap_or_default().trim().to_string();
    if !name.is_empty() && !is_valid_name(&name) {
        return Err(PorticoError::invalid_input(format!(
            "namespace name '{name}' contains illegal characters"
        )));
    }

    Ok(NamespaceInfo {
        id,
        name,
        description: form.description.clone().unwrap_or_default(),
    })
}

pub async fn validate_resource(
    repository: &ConfigRepository,
    form: &ResourceForm,
) -> PorticoResult<ResourceInfo> {
    let supplied_id = present(&form.id);
    if let Some(id) = supplied_id {
        require_uuid("id", id)?;
    }
    require_uuid("namespaceId", &form.namespace_id)?;
    let parent_id = present(&form.parent_resource_id);
    if let Some(parent_id) = parent_id {
        require_uuid("parentResourceId", parent_id)?;
        if supplied_id == Some(parent_id) {
            return Err(PorticoError::invalid_input(
                "a resource cannot be its own parent",
            ));
        }
    }

    let path = form.path.trim();
    if !is_valid_path(path) {
        return Err(PorticoError::invalid_input(format!(
            "path '{path}' may only contain letters, digits, '-' and '_'"
        )));
    }

    let backend = repository.backend();
    if repository
        .run(
            "namespace_find_by_id",
            backend.namespace_find_by_id(&form.namespace_id),
        )
        .await?
        .is_none()
    {
        return Err(PorticoError::not_found(format!(
            "namespace '{}' does not exist",
            form.namespace_id
        )));
    }

    if let Some(parent_id) = parent_id {
        let parent = repository
            .run("resource_find_by_id", backend.resource_find_by_id(parent_id))
            .await?
            .ok_or_else(|| {
                PorticoError::not_found(format!("parent resource '{parent_id}' does not exist"))
            })?;
        if parent.namespace_id != form.namespace_id {
            return Err(PorticoError::invalid_input(format!(
                "parent resource '{parent_id}' belongs to another namespace"
            )));
        }

        // the new resource sits one level below its parent
        let mut depth = 2;
        let mut ancestor = parent.parent_resource_id;
        while let Some(ancestor_id) = ancestor {
            depth += 1;
            if depth > MAX_RESOURCE_DEPTH {
                return Err(PorticoError::invalid_input(format!(
                    "resources may nest at most {MAX_RESOURCE_DEPTH} levels deep"
                )));
            }
            ancestor = repository
                .run(
                    "resource_find_by_id",
                    backend.resource_find_by_id(&ancestor_id),
                )
                .await?
                .and_then(|r| r.parent_resource_id);
        }
    }

    let resource = ResourceInfo {
        id: supplied_id.map(str::to_string).unwrap_or_else(new_id),
        namespace_id: form.namespace_id.clone(),
        parent_resource_id: parent_id.map(str::to_string),
        path: path.to_string(),
    };

    match supplied_id {
        Some(id) => {
            let existing = repository
                .run("resource_find_by_id", backend.resource_find_by_id(id))
                .await?;
            if let Some(existing) = existing
                && (existing.namespace_id != resource.namespace_id
                    || existing.parent_resource_id != resource.parent_resource_id)
            {
                return Err(PorticoError::invalid_input(format!(
                    "resource '{id}' cannot be moved to another namespace or parent"
                )));
            }
        }
        None => {
            let siblings = repository
                .run(
                    "resource_count_siblings",
                    backend.resource_count_siblings(
                        &resource.namespace_id,
                        resource.parent_resource_id.as_deref(),
                        &resource.path,
                    ),
                )
                .await?;
            if siblings > 0 {
                return Err(PorticoError::conflict(format!(
                    "resource path '{}' already exists under the same parent",
                    resource.path
                )));
            }
        }
    }

    Ok(resource)
}

pub async fn validate_method(
    repository: &ConfigRepository,
    form: &MethodForm,
) -> PorticoResult<MethodInfo> {
    let supplied_id = present(&form.id);
    if let Some(id) = supplied_id {
        require_uuid("id", id)?;
    }
    require_uuid("resourceId", &form.resource_id)?;

    let integration_type = form.integration_type.unwrap_or_default();
    let endpoint_url = form
        .endpoint_url
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_string();
    if (integration_type == IntegrationType::Http || !endpoint_url.is_empty())
        && !is_valid_url(&endpoint_url)
    {
        return Err(PorticoError::invalid_input(format!(
            "endpointUrl '{endpoint_url}' is not a valid URL"
        )));
    }

    let mock_response_body = match integration_type {
        IntegrationType::Mock => {
            let body = present(&form.mock_response_body).unwrap_or(DEFAULT_MOCK_RESPONSE_BODY);
            if !is_valid_json(body) {
                return Err(PorticoError::invalid_input(
                    "mockResponseBody is not valid JSON",
                ));
            }
            Some(body.to_string())
        }
        IntegrationType::Http => present(&form.mock_response_body).map(str::to_string),
    };

    let mock_response_code = match form.mock_response_code {
        None | Some(0) => DEFAULT_MOCK_RESPONSE_CODE,
        Some(code) if (100..=599).contains(&code) => code,
        Some(code) => {
            return Err(PorticoError::invalid_input(format!(
                "mockResponseCode {code} is not an HTTP status code"
            )));
        }
    };

    if let Some(rate_limit) = form.rate_limit
        && rate_limit < 0
    {
        return Err(PorticoError::invalid_input("rateLimit must not be negative"));
    }

    let timeout_ms = form.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
    if timeout_ms <= 0 {
        return Err(PorticoError::invalid_input("timeoutMs must be positive"));
    }

    let backend = repository.backend();
    if repository
        .run(
            "resource_find_by_id",
            backend.resource_find_by_id(&form.resource_id),
        )
        .await?
        .is_none()
    {
        return Err(PorticoError::not_found(format!(
            "resource '{}' does not exist",
            form.resource_id
        )));
    }

    if supplied_id.is_none() {
        let taken = repository
            .run(
                "method_count_by_resource_verb",
                backend.method_count_by_resource_verb(&form.resource_id, form.verb),
            )
            .await?;
        if taken > 0 {
            return Err(PorticoError::conflict(format!(
                "method {} already exists on resource '{}'",
                form.verb, form.resource_id
            )));
        }
    }

    let text = |value: &Option<String>, default: &str| {
        present(value).unwrap_or(default).to_string()
    };

    Ok(MethodInfo {
        id: supplied_id.map(str::to_string).unwrap_or_else(new_id),
        resource_id: form.resource_id.clone(),
        verb: form.verb,
        auth_type: text(&form.auth_type, DEFAULT_AUTH_TYPE),
        content_type: text(&form.content_type, DEFAULT_CONTENT_TYPE),
        deny_upload: form.deny_upload.unwrap_or(false),
        rate_limit: form.rate_limit,
        integration_type,
        forwarded_method: form.forwarded_method.unwrap_or(form.verb),
        endpoint_url,
        endpoint_protocol: text(&form.endpoint_protocol, DEFAULT_ENDPOINT_PROTOCOL),
        content_handling: text(&form.content_handling, DEFAULT_CONTENT_HANDLING),
        timeout_ms,
        mock_response_body,
        mock_response_code,
        mock_response_content: text(&form.mock_response_content, DEFAULT_CONTENT_TYPE),
        active: form.active.unwrap_or(true),
    })
}
