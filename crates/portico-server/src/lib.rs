// Portico - API gateway control plane
// Stores the namespace/resource/method routing configuration and gates the
// management API behind bearer authentication and traffic shaping

pub mod api; // HTTP handlers and routes
pub mod error; // Handler-boundary error type
pub mod middleware; // Authentication, traffic shaping, security headers
pub mod model; // Configuration, forms and shared state
pub mod service; // Validation, tree building and storage orchestration
pub mod startup; // Logging and HTTP server setup

pub use model::{AppState, config::Configuration};
