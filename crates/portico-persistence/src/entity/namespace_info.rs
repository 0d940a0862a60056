//! `SeaORM` Entity for namespace_info table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "namespace_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub gmt_create: i64,
    pub gmt_modified: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::resource_info::Entity")]
    ResourceInfo,
}

impl Related<super::resource_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResourceInfo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
