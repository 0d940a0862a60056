//! `SeaORM` Entity for resource_info table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "resource_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub namespace_id: String,
    pub parent_resource_id: Option<String>,
    /// Parent id, or empty at namespace root; part of the sibling unique key
    pub parent_scope: String,
    pub path: String,
    pub gmt_create: i64,
    pub gmt_modified: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::namespace_info::Entity",
        from = "Column::NamespaceId",
        to = "super::namespace_info::Column::Id",
        on_delete = "Restrict"
    )]
    NamespaceInfo,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentResourceId",
        to = "Column::Id",
        on_delete = "Restrict"
    )]
    Parent,
    #[sea_orm(has_many = "super::method_info::Entity")]
    MethodInfo,
}

impl Related<super::namespace_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NamespaceInfo.def()
    }
}

impl Related<super::method_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MethodInfo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
