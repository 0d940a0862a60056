//! Shared state handed to every handler

use std::sync::Arc;
use std::time::Duration;

use portico_persistence::PersistenceService;

use crate::service::{
    ConfigRepository,
    audit::{AuditSink, TracingAuditSink},
};

pub struct AppState {
    pub repository: ConfigRepository,
    pub audit: Arc<dyn AuditSink>,
}

impl AppState {
    pub fn new(persistence: Arc<dyn PersistenceService>, storage_timeout: Duration) -> Self {
        Self {
            repository: ConfigRepository::new(persistence, storage_timeout),
            audit: Arc::new(TracingAuditSink),
        }
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }
}
