//! Structured record of every management call
//!
//! Each handler emits exactly one event: `log` on success, `log_error` on
//! failure. The default sink writes them through `tracing`, which routes this
//! module's target into `audit.log`.

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuditEvent {
    pub route: String,
    pub payload: Value,
    pub response: Value,
}

impl AuditEvent {
    pub fn new(route: impl Into<String>, payload: Value, response: Value) -> Self {
        Self {
            route: route.into(),
            payload,
            response,
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn log(&self, event: &AuditEvent);

    fn log_error(&self, event: &AuditEvent);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn log(&self, event: &AuditEvent) {
        tracing::info!(
            route = %event.route,
            payload = %event.payload,
            response = %event.response,
            "Handled management call"
        );
    }

    fn log_error(&self, event: &AuditEvent) {
        tracing::error!(
            route = %event.route,
            payload = %event.payload,
            response = %event.response,
            "Management call failed"
        );
    }
}
