//! Credential repository
//!
//! Storage for usernames and password hashes:
//! - `CredentialStore` trait used by the auth service
//! - `PgCredentialStore` backed by the `users` table
//! - `InMemoryCredentialStore` for tests and local runs
//!
//! Username uniqueness is enforced by the store itself, never by a
//! lookup before insert.

use super::models::Credential;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Repository errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    DuplicateUsername,
}

/// Credential storage operations
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Store a new credential.
    ///
    /// Fails with [`RepositoryError::DuplicateUsername`] when the username is taken.
    async fn create(&self, username: &str, password_hash: &str)
        -> Result<Credential, RepositoryError>;

    /// Find a credential by username.
    ///
    /// Fails with [`RepositoryError::UserNotFound`] when no credential exists.
    async fn find_by_username(&self, username: &str) -> Result<Credential, RepositoryError>;
}

/// PostgreSQL credential store
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Credential row from database
#[derive(Debug, sqlx::FromRow)]
struct CredentialRecord {
    id: i64,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<CredentialRecord> for Credential {
    fn from(record: CredentialRecord) -> Self {
        Credential {
            id: record.id,
            username: record.username,
            password_hash: record.password_hash,
            created_at: record.created_at,
        }
    }
}

/// Map an insert failure, turning the unique constraint violation into a typed error
fn map_insert_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::DuplicateUsername
        }
        _ => RepositoryError::DatabaseError(err.to_string()),
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Credential, RepositoryError> {
        // The UNIQUE constraint on users.username arbitrates concurrent inserts
        let record = sqlx::query_as::<_, CredentialRecord>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(record.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Credential, RepositoryError> {
        sqlx::query_as::<_, CredentialRecord>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
        .map(Credential::from)
        .ok_or(RepositoryError::UserNotFound)
    }
}

/// In-memory credential store
///
/// The existence check and the insert happen under one write lock, so
/// concurrent registrations of a username resolve like the SQL constraint.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<InMemoryCredentials>,
}

#[derive(Default)]
struct InMemoryCredentials {
    next_id: i64,
    by_username: HashMap<String, Credential>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_username.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Credential, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.by_username.contains_key(username) {
            return Err(RepositoryError::DuplicateUsername);
        }

        inner.next_id += 1;
        let credential = Credential {
            id: inner.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner
            .by_username
            .insert(credential.username.clone(), credential.clone());

        Ok(credential)
    }

    async fn find_by_username(&self, username: &str) -> Result<Credential, RepositoryError> {
        self.inner
            .read()
            .await
            .by_username
            .get(username)
            .cloned()
            .ok_or(RepositoryError::UserNotFound)
    }
}
