pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

// Use case and its ports; adapters for the outside world live in infra
pub mod app;
pub mod infra;
