//! HRM Core - Domain models, storage traits, and shared types
//!
//! This crate defines the core abstractions used throughout the HRM system:
//! - Employee records and salary rules
//! - Common error types
//! - Employee storage (PostgreSQL and in-memory)
//! - Database schema bootstrap
//! - Configuration management

pub mod config;
pub mod employee;
pub mod schema;
pub mod store;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig};
pub use employee::{deduction_rate, Employee, EmployeeInput, NetSalary, SalaryMetrics};
pub use schema::{connect_pool, run_migrations};
pub use store::{EmployeeRepository, InMemoryEmployeeStore, PgEmployeeStore};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for HRM operations
#[derive(Error, Debug)]
pub enum HrmError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for HrmError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => HrmError::NotFound("row".to_string()),
            other => HrmError::DatabaseError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, HrmError>;
