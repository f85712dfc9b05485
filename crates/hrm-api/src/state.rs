//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::auth::{
    AuthService, BearerAuthGuard, CredentialStore, GuardChain, JwtConfig, PasswordConfig,
    PgCredentialStore, TokenIssuer,
};
use hrm_core::{AppConfig, EmployeeRepository, PgEmployeeStore};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
///
/// Read-only after startup; every field is safe to use from concurrent
/// request tasks.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Registration and login
    pub auth: AuthService,
    /// Employee records
    pub employees: Arc<dyn EmployeeRepository>,
    /// Connection pool, absent when running on in-memory stores
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn new(config: AppConfig, db_pool: PgPool) -> Self {
        let credentials = Arc::new(PgCredentialStore::new(db_pool.clone()));
        let employees = Arc::new(PgEmployeeStore::from_pool(db_pool.clone()));
        Self::with_stores(config, credentials, employees, Some(db_pool))
    }

    /// State over arbitrary stores
    pub fn with_stores(
        config: AppConfig,
        credentials: Arc<dyn CredentialStore>,
        employees: Arc<dyn EmployeeRepository>,
        db_pool: Option<PgPool>,
    ) -> Self {
        let tokens = TokenIssuer::new(JwtConfig::from(&config.auth));
        let auth = AuthService::new(credentials, tokens, PasswordConfig::from(&config.auth));

        Self {
            config,
            start_time: Instant::now(),
            auth,
            employees,
            db_pool,
        }
    }

    /// Guards applied to every protected route
    pub fn guard_chain(&self) -> GuardChain {
        GuardChain::new().with(BearerAuthGuard::new(self.auth.tokens().clone()))
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
