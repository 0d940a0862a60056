//! Application startup utilities module.

pub mod http;
pub mod logging;

pub use http::{app, main_server};
pub use logging::{LoggingConfig, LoggingGuard, init_logging};
