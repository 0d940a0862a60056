//! Resource management endpoints

use actix_web::{Responder, delete, get, post, put, web};
use serde_json::json;

use crate::{
    api::{payload_of, respond},
    model::{
        AppState,
        form::{ResourceForm, ResourceQuery},
    },
    service,
};

/// GET /resources
#[get("")]
async fn list_resources(
    data: web::Data<AppState>,
    query: web::Query<ResourceQuery>,
) -> impl Responder {
    let result =
        service::resource::find_all(&data.repository, query.namespace_id.as_deref()).await;
    respond(
        &data,
        "GET /resources",
        json!({ "namespaceId": query.namespace_id }),
        result,
    )
}

/// GET /resources/{id}
#[get("/{id}")]
async fn get_resource(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let result = service::resource::get_by_id(&data.repository, &id).await;
    respond(&data, "GET /resources/{id}", json!({ "id": *id }), result)
}

/// POST /resources
#[post("")]
async fn create_resource(
    data: web::Data<AppState>,
    form: web::Json<ResourceForm>,
) -> impl Responder {
    let result = service::resource::add_or_update(&data.repository, &form).await;
    respond(&data, "POST /resources", payload_of(&*form), result)
}

/// PUT /resources
#[put("")]
async fn update_resource(
    data: web::Data<AppState>,
    form: web::Json<ResourceForm>,
) -> impl Responder {
    let result = service::resource::add_or_update(&data.repository, &form).await;
    respond(&data, "PUT /resources", payload_of(&*form), result)
}

/// DELETE /resources/{id}
#[delete("/{id}")]
async fn delete_resource(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let result = service::resource::delete(&data.repository, &id).await;
    respond(&data, "DELETE /resources/{id}", json!({ "id": *id }), result)
}

/// GET /resources/{id}/methods
#[get("/{id}/methods")]
async fn get_resource_methods(
    data: web::Data<AppState>,
    id: web::Path<String>,
) -> impl Responder {
    let result = service::resource::get_methods(&data.repository, &id).await;
    respond(
        &data,
        "GET /resources/{id}/methods",
        json!({ "id": *id }),
        result,
    )
}

/// GET /namespaces/{id}/resources/tree
#[get("/{id}/resources/tree")]
pub(crate) async fn get_resource_tree(
    data: web::Data<AppState>,
    id: web::Path<String>,
) -> impl Responder {
    let result = service::resource::get_tree_by_namespace(&data.repository, &id).await;
    respond(
        &data,
        "GET /namespaces/{id}/resources/tree",
        json!({ "namespaceId": *id }),
        result,
    )
}

pub fn routes() -> actix_web::Scope {
    web::scope("/resources")
        .service(list_resources)
        .service(get_resource)
        .service(create_resource)
        .service(update_resource)
        .service(delete_resource)
        .service(get_resource_methods)
}
