//! Business logic for the management API
//!
//! Handlers call into the per-entity modules here; every storage call those
//! modules make goes through [`ConfigRepository::run`], which bounds it by the
//! configured storage timeout.

pub mod audit;
pub mod method;
pub mod namespace;
pub mod resource;
pub mod tree;
pub mod validator;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use portico_common::{PorticoError, PorticoResult};
use portico_persistence::{PersistError, PersistResult, PersistenceService};

/// Storage handle shared by all services
#[derive(Clone)]
pub struct ConfigRepository {
    persistence: Arc<dyn PersistenceService>,
    timeout: Duration,
}

impl ConfigRepository {
    pub fn new(persistence: Arc<dyn PersistenceService>, timeout: Duration) -> Self {
        Self {
            persistence,
            timeout,
        }
    }

    pub fn backend(&self) -> &dyn PersistenceService {
        self.persistence.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Await one storage call, failing with `Timeout` once the bound elapses.
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> PorticoResult<T>
    where
        F: Future<Output = PersistResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| {
                if let PersistError::Backend(cause) = &e {
                    tracing::error!(operation, error = %cause, "Storage call failed");
                }
                PorticoError::from(e)
            }),
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Storage call timed out"
                );
                Err(PorticoError::Timeout(format!(
                    "{} did not complete within {}ms",
                    operation,
                    self.timeout.as_millis()
                )))
            }
        }
    }
}
