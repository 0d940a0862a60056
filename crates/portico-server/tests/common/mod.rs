//! Common test utilities for the management API
//!
//! Builds the real application over the in-memory backend, with an audit
//! sink that records every event so tests can assert on the handler boundary.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    App, Error,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::header::HeaderName,
    test::TestRequest,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;
use serde_json::Value;

use portico_auth::TokenService;
use portico_persistence::MemoryPersistService;
use portico_server::{
    AppState,
    middleware::{
        auth::Authentication,
        rate_limit::{TrafficGovernor, TrafficSettings},
    },
    service::audit::{AuditEvent, AuditSink},
    startup,
};

#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<(bool, AuditEvent)>>,
}

impl RecordingAuditSink {
    pub fn successes(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(ok, _)| *ok)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn failures(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(ok, _)| !*ok)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }
}

impl AuditSink for RecordingAuditSink {
    fn log(&self, event: &AuditEvent) {
        self.events.lock().push((true, event.clone()));
    }

    fn log_error(&self, event: &AuditEvent) {
        self.events.lock().push((false, event.clone()));
    }
}

pub fn state() -> (Arc<AppState>, Arc<RecordingAuditSink>) {
    let sink = Arc::new(RecordingAuditSink::default());
    let state = AppState::new(Arc::new(MemoryPersistService::new()), Duration::from_secs(5))
        .with_audit_sink(sink.clone());
    (Arc::new(state), sink)
}

pub fn quiet_traffic() -> TrafficSettings {
    TrafficSettings {
        enabled: false,
        ..Default::default()
    }
}

pub fn secret() -> String {
    STANDARD.encode("portico-integration-test-secret-0123456789")
}

pub fn token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(&secret(), Duration::from_secs(3600)).unwrap())
}

/// Application with the gate in demo mode and traffic shaping off
pub fn demo_app(
    state: Arc<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    startup::app(
        state,
        Authentication::disabled(),
        TrafficGovernor::new(quiet_traffic()),
        "",
    )
}

/// Application with the gate enforcing credentials signed by `tokens`
pub fn secured_app(
    state: Arc<AppState>,
    tokens: Arc<TokenService>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    startup::app(
        state,
        Authentication::with_service(tokens, HeaderName::from_static("authorization")),
        TrafficGovernor::new(quiet_traffic()),
        "",
    )
}

pub fn post_json(uri: &str, body: Value) -> TestRequest {
    TestRequest::post().uri(uri).set_json(body)
}

pub fn put_json(uri: &str, body: Value) -> TestRequest {
    TestRequest::put().uri(uri).set_json(body)
}
