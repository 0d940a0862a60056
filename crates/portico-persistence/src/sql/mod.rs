//! SQL-based persistence backend (MySQL/PostgreSQL via SeaORM)
//!
//! Upserts and deletes run their checks and write inside one transaction. The
//! schema carries unique indexes for the sibling-path and resource-verb keys
//! and restricting foreign keys from resources to their namespace and parent
//! and from methods to their resource.

use async_trait::async_trait;
use sea_orm::{prelude::Expr, sea_query::Index, *};

use crate::entity::{method_info, namespace_info, resource_info};
use crate::model::*;
use crate::traits::*;

const RESOURCE_SIBLING_INDEX: &str = "uk_resource_sibling_path";
const METHOD_VERB_INDEX: &str = "uk_method_resource_verb";

/// External database persistence service
pub struct ExternalDbPersistService {
    db: DatabaseConnection,
}

impl ExternalDbPersistService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Create tables, foreign keys and unique indexes when they are missing
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        let tables = [
            schema
                .create_table_from_entity(namespace_info::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(resource_info::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(method_info::Entity)
                .if_not_exists()
                .to_owned(),
        ];
        for table in &tables {
            self.db.execute(backend.build(table)).await?;
        }

        let indexes = [
            Index::create()
                .name(RESOURCE_SIBLING_INDEX)
                .table(resource_info::Entity)
                .col(resource_info::Column::NamespaceId)
                .col(resource_info::Column::ParentScope)
                .col(resource_info::Column::Path)
                .unique()
                .to_owned(),
            Index::create()
                .name(METHOD_VERB_INDEX)
                .table(method_info::Entity)
                .col(method_info::Column::ResourceId)
                .col(method_info::Column::Verb)
                .unique()
                .to_owned(),
        ];
        for index in &indexes {
            // MySQL has no CREATE INDEX IF NOT EXISTS; an existing index is expected on restart
            if let Err(e) = self.db.execute(backend.build(index)).await {
                tracing::debug!("Skipping index creation: {}", e);
            }
        }

        tracing::info!("Persistence schema ready on {:?}", backend);
        Ok(())
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A foreign key failure on delete means dependents were added concurrently
fn delete_failed(err: DbErr, what: String) -> PersistError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => PersistError::StillReferenced(what),
        _ => err.into(),
    }
}

fn corrupt(column: &str, message: String) -> PersistError {
    PersistError::Backend(anyhow::anyhow!("corrupt {} column: {}", column, message))
}

impl From<namespace_info::Model> for NamespaceInfo {
    fn from(value: namespace_info::Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
        }
    }
}

impl From<resource_info::Model> for ResourceInfo {
    fn from(value: resource_info::Model) -> Self {
        Self {
            id: value.id,
            namespace_id: value.namespace_id,
            parent_resource_id: value.parent_resource_id,
            path: value.path,
        }
    }
}

impl TryFrom<method_info::Model> for MethodInfo {
    type Error = PersistError;

    fn try_from(value: method_info::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            verb: value.verb.parse().map_err(|e| corrupt("verb", e))?,
            integration_type: value
                .integration_type
                .parse()
                .map_err(|e| corrupt("integration_type", e))?,
            forwarded_method: value
                .forwarded_method
                .parse()
                .map_err(|e| corrupt("forwarded_method", e))?,
            id: value.id,
            resource_id: value.resource_id,
            auth_type: value.auth_type,
            content_type: value.content_type,
            deny_upload: value.deny_upload,
            rate_limit: value.rate_limit,
            endpoint_url: value.endpoint_url,
            endpoint_protocol: value.endpoint_protocol,
            content_handling: value.content_handling,
            timeout_ms: value.timeout_ms,
            mock_response_body: value.mock_response_body,
            mock_response_code: value.mock_response_code,
            mock_response_content: value.mock_response_content,
            active: value.active,
        })
    }
}

fn into_methods(models: Vec<method_info::Model>) -> PersistResult<Vec<MethodInfo>> {
    models.into_iter().map(MethodInfo::try_from).collect()
}

#[async_trait]
impl PersistenceService for ExternalDbPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::ExternalDb
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        namespace_info::Entity::find()
            .select_only()
            .column_as(Expr::cust("1"), "health")
            .into_tuple::<i32>()
            .one(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl NamespacePersistence for ExternalDbPersistService {
    async fn namespace_find_all(&self) -> PersistResult<Vec<NamespaceInfo>> {
        let models = namespace_info::Entity::find()
            .order_by_asc(namespace_info::Column::GmtCreate)
            .order_by_asc(namespace_info::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(NamespaceInfo::from).collect())
    }

    async fn namespace_find_by_id(&self, id: &str) -> PersistResult<Option<NamespaceInfo>> {
        let model = namespace_info::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(NamespaceInfo::from))
    }

    async fn namespace_upsert(&self, namespace: NamespaceInfo) -> PersistResult<NamespaceInfo> {
        let txn = self.db.begin().await?;
        let now = now_millis();

        match namespace_info::Entity::find_by_id(namespace.id.clone())
            .one(&txn)
            .await?
        {
            Some(existing) => {
                let mut active: namespace_info::ActiveModel = existing.into();
                active.name = Set(namespace.name.clone());
                active.description = Set(namespace.description.clone());
                active.gmt_modified = Set(now);
                active.update(&txn).await?;
            }
            None => {
                let entity = namespace_info::ActiveModel {
                    id: Set(namespace.id.clone()),
                    name: Set(namespace.name.clone()),
                    description: Set(namespace.description.clone()),
                    gmt_create: Set(now),
                    gmt_modified: Set(now),
                };
                namespace_info::Entity::insert(entity).exec(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(namespace)
    }

    async fn namespace_delete(&self, id: &str) -> PersistResult<bool> {
        let txn = self.db.begin().await?;

        let owned = resource_info::Entity::find()
            .filter(resource_info::Column::NamespaceId.eq(id))
            .count(&txn)
            .await?;
        let what = format!("namespace '{id}' still owns resources");
        if owned > 0 {
            return Err(PersistError::StillReferenced(what));
        }

        let result = namespace_info::Entity::delete_by_id(id.to_string())
            .exec(&txn)
            .await
            .map_err(|e| delete_failed(e, what.clone()))?;
        txn.commit().await.map_err(|e| delete_failed(e, what))?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl ResourcePersistence for ExternalDbPersistService {
    async fn resource_find_all(&self) -> PersistResult<Vec<ResourceInfo>> {
        let models = resource_info::Entity::find()
            .order_by_asc(resource_info::Column::GmtCreate)
            .order_by_asc(resource_info::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(ResourceInfo::from).collect())
    }

    async fn resource_find_by_id(&self, id: &str) -> PersistResult<Option<ResourceInfo>> {
        let model = resource_info::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(ResourceInfo::from))
    }

    async fn resource_find_by_namespace(
        &self,
        namespace_id: &str,
    ) -> PersistResult<Vec<ResourceInfo>> {
        let models = resource_info::Entity::find()
            .filter(resource_info::Column::NamespaceId.eq(namespace_id))
            .order_by_asc(resource_info::Column::GmtCreate)
            .order_by_asc(resource_info::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(ResourceInfo::from).collect())
    }

    async fn resource_count_siblings(
        &self,
        namespace_id: &str,
        parent_resource_id: Option<&str>,
        path: &str,
    ) -> PersistResult<u64> {
        let count = resource_info::Entity::find()
            .filter(resource_info::Column::NamespaceId.eq(namespace_id))
            .filter(resource_info::Column::ParentScope.eq(parent_resource_id.unwrap_or("")))
            .filter(resource_info::Column::Path.eq(path))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn resource_count_children(&self, id: &str) -> PersistResult<u64> {
        let count = resource_info::Entity::find()
            .filter(resource_info::Column::ParentResourceId.eq(id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn resource_count_by_namespace(&self, namespace_id: &str) -> PersistResult<u64> {
        let count = resource_info::Entity::find()
            .filter(resource_info::Column::NamespaceId.eq(namespace_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn resource_upsert(&self, resource: ResourceInfo) -> PersistResult<ResourceInfo> {
        let txn = self.db.begin().await?;
        let now = now_millis();
        let parent_scope = resource.parent_scope().to_string();

        if namespace_info::Entity::find_by_id(resource.namespace_id.clone())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(PersistError::MissingReference(format!(
                "namespace '{}' does not exist",
                resource.namespace_id
            )));
        }
        if let Some(parent_id) = resource.parent_resource_id.as_deref() {
            let parent = resource_info::Entity::find_by_id(parent_id.to_string())
                .one(&txn)
                .await?;
            if parent.is_none_or(|p| p.namespace_id != resource.namespace_id) {
                return Err(PersistError::MissingReference(format!(
                    "parent resource '{}' does not exist in namespace '{}'",
                    parent_id, resource.namespace_id
                )));
            }
        }

        match resource_info::Entity::find_by_id(resource.id.clone())
            .one(&txn)
            .await?
        {
            Some(existing) => {
                let mut active: resource_info::ActiveModel = existing.into();
                active.path = Set(resource.path.clone());
                active.gmt_modified = Set(now);
                active.update(&txn).await?;
            }
            None => {
                let entity = resource_info::ActiveModel {
                    id: Set(resource.id.clone()),
                    namespace_id: Set(resource.namespace_id.clone()),
                    parent_resource_id: Set(resource.parent_resource_id.clone()),
                    parent_scope: Set(parent_scope),
                    path: Set(resource.path.clone()),
                    gmt_create: Set(now),
                    gmt_modified: Set(now),
                };
                resource_info::Entity::insert(entity).exec(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(resource)
    }

    async fn resource_delete(&self, id: &str) -> PersistResult<bool> {
        let txn = self.db.begin().await?;

        let children = resource_info::Entity::find()
            .filter(resource_info::Column::ParentResourceId.eq(id))
            .count(&txn)
            .await?;
        let methods = method_info::Entity::find()
            .filter(method_info::Column::ResourceId.eq(id))
            .count(&txn)
            .await?;
        let what = format!("resource '{id}' still has child resources or methods");
        if children > 0 || methods > 0 {
            return Err(PersistError::StillReferenced(what));
        }

        let result = resource_info::Entity::delete_by_id(id.to_string())
            .exec(&txn)
            .await
            .map_err(|e| delete_failed(e, what.clone()))?;
        txn.commit().await.map_err(|e| delete_failed(e, what))?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl MethodPersistence for ExternalDbPersistService {
    async fn method_find_all(&self) -> PersistResult<Vec<MethodInfo>> {
        let models = method_info::Entity::find()
            .order_by_asc(method_info::Column::GmtCreate)
            .order_by_asc(method_info::Column::Id)
            .all(&self.db)
            .await?;
        into_methods(models)
    }

    async fn method_find_by_id(&self, id: &str) -> PersistResult<Option<MethodInfo>> {
        method_info::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(MethodInfo::try_from)
            .transpose()
    }

    async fn method_find_by_resource(&self, resource_id: &str) -> PersistResult<Vec<MethodInfo>> {
        let models = method_info::Entity::find()
            .filter(method_info::Column::ResourceId.eq(resource_id))
            .order_by_asc(method_info::Column::GmtCreate)
            .order_by_asc(method_info::Column::Id)
            .all(&self.db)
            .await?;
        into_methods(models)
    }

    async fn method_find_by_resources(
        &self,
        resource_ids: &[String],
    ) -> PersistResult<Vec<MethodInfo>> {
        if resource_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = method_info::Entity::find()
            .filter(method_info::Column::ResourceId.is_in(resource_ids.iter().cloned()))
            .order_by_asc(method_info::Column::GmtCreate)
            .order_by_asc(method_info::Column::Id)
            .all(&self.db)
            .await?;
        into_methods(models)
    }

    async fn method_count_by_resource_verb(
        &self,
        resource_id: &str,
        verb: HttpVerb,
    ) -> PersistResult<u64> {
        let count = method_info::Entity::find()
            .filter(method_info::Column::ResourceId.eq(resource_id))
            .filter(method_info::Column::Verb.eq(verb.as_str()))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn method_count_by_resource(&self, resource_id: &str) -> PersistResult<u64> {
        let count = method_info::Entity::find()
            .filter(method_info::Column::ResourceId.eq(resource_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn method_upsert(&self, method: MethodInfo) -> PersistResult<MethodInfo> {
        let txn = self.db.begin().await?;
        let now = now_millis();

        if resource_info::Entity::find_by_id(method.resource_id.clone())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(PersistError::MissingReference(format!(
                "resource '{}' does not exist",
                method.resource_id
            )));
        }

        let existing = method_info::Entity::find_by_id(method.id.clone())
            .one(&txn)
            .await?;
        let gmt_create = existing.as_ref().map(|m| m.gmt_create).unwrap_or(now);

        let entity = method_info::ActiveModel {
            id: Set(method.id.clone()),
            resource_id: Set(method.resource_id.clone()),
            verb: Set(method.verb.as_str().to_string()),
            auth_type: Set(method.auth_type.clone()),
            content_type: Set(method.content_type.clone()),
            deny_upload: Set(method.deny_upload),
            rate_limit: Set(method.rate_limit),
            integration_type: Set(method.integration_type.as_str().to_string()),
            forwarded_method: Set(method.forwarded_method.as_str().to_string()),
            endpoint_url: Set(method.endpoint_url.clone()),
            endpoint_protocol: Set(method.endpoint_protocol.clone()),
            content_handling: Set(method.content_handling.clone()),
            timeout_ms: Set(method.timeout_ms),
            mock_response_body: Set(method.mock_response_body.clone()),
            mock_response_code: Set(method.mock_response_code),
            mock_response_content: Set(method.mock_response_content.clone()),
            active: Set(method.active),
            gmt_create: Set(gmt_create),
            gmt_modified: Set(now),
        };

        if existing.is_some() {
            entity.update(&txn).await?;
        } else {
            method_info::Entity::insert(entity).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(method)
    }

    async fn method_delete(&self, id: &str) -> PersistResult<bool> {
        let result = method_info::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
