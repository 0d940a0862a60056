//! Handler-boundary error type
//!
//! Wraps [`PorticoError`] so it can be returned from actix handlers and
//! extractor error hooks. Every error kind maps to one status code and one
//! envelope shape: `{ code, message, data }`, with `data` naming the kind.

use actix_web::{
    HttpRequest, HttpResponse, ResponseError,
    error::{JsonPayloadError, PathError, QueryPayloadError},
    http::StatusCode,
    web,
};
use serde_json::json;

use portico_common::PorticoError;

use crate::model::{AppState, response};
use crate::service::audit::AuditEvent;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct AppError(#[from] pub PorticoError);

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        response::Result::<&str>::http_response(
            self.0.status(),
            self.0.error_code().code,
            self.0.to_string(),
            self.0.kind(),
        )
    }
}

/// Turn an extractor failure into `InvalidInput`, recording it like any
/// other failed management call
fn reject(req: &HttpRequest, part: &str, err: &dyn std::fmt::Display) -> actix_web::Error {
    let err = PorticoError::invalid_input(format!("malformed {part}: {err}"));
    tracing::warn!(path = %req.path(), error = %err, "Rejected request {}", part);

    if let Some(data) = req.app_data::<web::Data<AppState>>() {
        let route = format!(
            "{} {}",
            req.method(),
            req.match_pattern().unwrap_or_else(|| req.path().to_string())
        );
        data.audit.log_error(&AuditEvent::new(
            route,
            json!({
                "path": req.path(),
                "query": req.query_string(),
                "contentType": req
                    .headers()
                    .get(actix_web::http::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok()),
            }),
            json!({
                "status": err.status(),
                "kind": err.kind(),
                "message": err.to_string(),
            }),
        ));
    }

    AppError(err).into()
}

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    reject(req, "body", &err)
}

pub fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    reject(req, "path", &err)
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    reject(req, "query", &err)
}
