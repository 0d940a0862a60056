//! `SeaORM` Entity for method_info table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "method_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub resource_id: String,
    pub verb: String,
    pub auth_type: String,
    pub content_type: String,
    pub deny_upload: bool,
    pub rate_limit: Option<i32>,
    pub integration_type: String,
    pub forwarded_method: String,
    #[sea_orm(column_type = "Text")]
    pub endpoint_url: String,
    pub endpoint_protocol: String,
    pub content_handling: String,
    pub timeout_ms: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub mock_response_body: Option<String>,
    pub mock_response_code: i32,
    pub mock_response_content: String,
    pub active: bool,
    pub gmt_create: i64,
    pub gmt_modified: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::resource_info::Entity",
        from = "Column::ResourceId",
        to = "super::resource_info::Column::Id",
        on_delete = "Restrict"
    )]
    ResourceInfo,
}

impl Related<super::resource_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResourceInfo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
