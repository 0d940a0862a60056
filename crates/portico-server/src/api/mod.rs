//! HTTP handlers for the management API
//!
//! Every handler ends in [`respond`], the single place where a service result
//! becomes an HTTP response and an audit event.

pub mod health;
pub mod method;
pub mod namespace;
pub mod resource;
pub mod route;

use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::{Value, json};

use portico_common::{PorticoError, PorticoResult};

use crate::{error::AppError, model::AppState, service::audit::AuditEvent};

pub(crate) fn respond<T: Serialize>(
    data: &AppState,
    route: &str,
    payload: Value,
    result: PorticoResult<T>,
) -> HttpResponse {
    let result = result.and_then(|body| {
        serde_json::to_value(&body)
            .map_err(|e| PorticoError::internal(format!("failed to encode response: {e}")))
    });

    match result {
        Ok(body) => {
            data.audit
                .log(&AuditEvent::new(route, payload, body.clone()));
            HttpResponse::Ok().json(body)
        }
        Err(err) => {
            data.audit.log_error(&AuditEvent::new(
                route,
                payload,
                json!({
                    "status": err.status(),
                    "kind": err.kind(),
                    "message": err.to_string(),
                }),
            ));
            AppError(err).error_response()
        }
    }
}

pub(crate) fn payload_of<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}
