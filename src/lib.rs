pub mod cli;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fs;
pub mod invocation;
pub mod logging;
pub mod service;
pub mod spec;
pub mod utils;
