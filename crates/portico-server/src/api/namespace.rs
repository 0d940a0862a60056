//! Namespace management endpoints

use actix_web::{Responder, delete, get, post, put, web};
use serde_json::json;

use crate::{
    api::{payload_of, respond},
    model::{AppState, form::NamespaceForm},
    service,
};

/// GET /namespaces
#[get("")]
async fn list_namespaces(data: web::Data<AppState>) -> impl Responder {
    let result = service::namespace::find_all(&data.repository).await;
    respond(&data, "GET /namespaces", json!({}), result)
}

/// GET /namespaces/{id}
#[get("/{id}")]
async fn get_namespace(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let result = service::namespace::get_by_id(&data.repository, &id).await;
    respond(&data, "GET /namespaces/{id}", json!({ "id": *id }), result)
}

/// POST /namespaces
#[post("")]
async fn create_namespace(
    data: web::Data<AppState>,
    form: web::Json<NamespaceForm>,
) -> impl Responder {
    let result = service::namespace::add_or_update(&data.repository, &form).await;
    respond(&data, "POST /namespaces", payload_of(&*form), result)
}

/// PUT /namespaces
#[put("")]
async fn update_namespace(
    data: web::Data<AppState>,
    form: web::Json<NamespaceForm>,
) -> impl Responder {
    let result = service::namespace::add_or_update(&data.repository, &form).await;
    respond(&data, "PUT /namespaces", payload_of(&*form), result)
}

/// DELETE /namespaces/{id}
#[delete("/{id}")]
async fn delete_namespace(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let result = service::namespace::delete(&data.repository, &id).await;
    respond(&data, "DELETE /namespaces/{id}", json!({ "id": *id }), result)
}

pub fn routes() -> actix_web::Scope {
    web::scope("/namespaces")
        .service(list_namespaces)
        .service(get_namespace)
        .service(create_namespace)
        .service(update_namespace)
        .service(delete_namespace)
        .service(super::resource::get_resource_tree)
}
