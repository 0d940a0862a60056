//! Data models for the Portico server

pub mod app_state;
pub mod config;
pub mod form;
pub mod response;

pub use app_state::AppState;
