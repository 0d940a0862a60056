//! Method management endpoints

use actix_web::{Responder, delete, get, post, put, web};
use serde_json::json;

use crate::{
    api::{payload_of, respond},
    model::{
        AppState,
        form::{MethodForm, MethodQuery},
    },
    service,
};

/// GET /methods
#[get("")]
async fn list_methods(data: web::Data<AppState>, query: web::Query<MethodQuery>) -> impl Responder {
    let result = service::method::find_all(&data.repository, query.resource_id.as_deref()).await;
    respond(
        &data,
        "GET /methods",
        json!({ "resourceId": query.resource_id }),
        result,
    )
}

/// GET /methods/{id}
#[get("/{id}")]
async fn get_method(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let result = service::method::get_by_id(&data.repository, &id).await;
    respond(&data, "GET /methods/{id}", json!({ "id": *id }), result)
}

/// POST /methods
#[post("")]
async fn create_method(data: web::Data<AppState>, form: web::Json<MethodForm>) -> impl Responder {
    let result = service::method::add_or_update(&data.repository, &form).await;
    respond(&data, "POST /methods", payload_of(&*form), result)
}

/// PUT /methods
#[put("")]
async fn update_method(data: web::Data<AppState>, form: web::Json<MethodForm>) -> impl Responder {
    let result = service::method::add_or_update(&data.repository, &form).await;
    respond(&data, "PUT /methods", payload_of(&*form), result)
}

/// DELETE /methods/{id}
#[delete("/{id}")]
async fn delete_method(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let result = service::method::delete(&data.repository, &id).await;
    respond(&data, "DELETE /methods/{id}", json!({ "id": *id }), result)
}

pub fn routes() -> actix_web::Scope {
    web::scope("/methods")
        .service(list_methods)
        .service(get_method)
        .service(create_method)
        .service(update_method)
        .service(delete_method)
}
