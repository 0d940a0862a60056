//! Liveness endpoint, served without a credential

use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;

use portico_common::PorticoError;

use crate::{api::respond, model::AppState};

/// GET /health
#[get("/health")]
async fn health(data: web::Data<AppState>) -> impl Responder {
    let repository = &data.repository;
    let backend = repository.backend();
    let storage = backend.storage_mode().to_string();

    match tokio::time::timeout(repository.timeout(), backend.health_check()).await {
        Ok(Ok(())) => HttpResponse::Ok().json(json!({ "status": "UP", "storage": storage })),
        Ok(Err(e)) => respond::<()>(
            &data,
            "GET /health",
            json!({}),
            Err(PorticoError::internal(format!("storage unhealthy: {e}"))),
        ),
        Err(_) => respond::<()>(
            &data,
            "GET /health",
            json!({}),
            Err(PorticoError::Timeout("storage health check".to_string())),
        ),
    }
}
