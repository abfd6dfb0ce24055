//! CLI command handlers extracted from main.rs.

// These modules contain CLI command handlers, not public library API.
#[allow(clippy::missing_errors_doc)]
pub mod api;
#[allow(clippy::missing_errors_doc)]
pub mod config;
#[allow(clippy::missing_errors_doc)]
pub mod openapi;
