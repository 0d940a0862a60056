//! Request payloads accepted by the management API
//!
//! Every field a caller may omit is optional here; defaults are applied by
//! the validator, not by serde, so the stored record always reflects one
//! normalization path.

use serde::{Deserialize, Serialize};

use portico_persistence::{HttpVerb, IntegrationType};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceForm {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceForm {
    pub id: Option<String>,
    #[serde(default)]
    pub namespace_id: String,
    pub parent_resource_id: Option<String>,
    #[serde(default)]
    pub path: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodForm {
    pub id: Option<String>,
    #[serde(default)]
    pub resource_id: String,
    pub verb: HttpVerb,
    pub auth_type: Option<String>,
    pub content_type: Option<String>,
    pub deny_upload: Option<bool>,
    pub rate_limit: Option<i32>,
    pub integration_type: Option<IntegrationType>,
    pub forwarded_method: Option<HttpVerb>,
    pub endpoint_url: Option<String>,
    pub endpoint_protocol: Option<String>,
    pub content_handling: Option<String>,
    pub timeout_ms: Option<i64>,
    pub mock_response_body: Option<String>,
    pub mock_response_code: Option<i32>,
    pub mock_response_content: Option<String>,
    pub active: Option<bool>,
}

/// Optional filter for `GET /resources`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceQuery {
    pub namespace_id: Option<String>,
}

/// Optional filter for `GET /methods`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodQuery {
    pub resource_id: Option<String>,
}

/// Body returned by every delete operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub id: String,
    pub deleted: bool,
}
