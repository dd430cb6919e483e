//! Arthub Common Library
//!
//! Shared code for the Arthub marketplace API including:
//! - Database models, schema bootstrap and the repository
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Response envelopes and pagination
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod response;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
