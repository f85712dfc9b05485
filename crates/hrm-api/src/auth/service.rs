//! Authentication service layer
//!
//! Business logic for registration and login. Storage is reached only through
//! [`CredentialStore`], tokens only through [`TokenIssuer`].

use super::jwt::TokenIssuer;
use super::models::{Credential, LoginRequest, RegisterRequest};
use super::password::{hash_password, verify_password, PasswordConfig, PasswordError};
use super::repository::{CredentialStore, RepositoryError};
use crate::audit::{audit_log, AuditContext, AuditEvent};
use crate::error::AppError;
use std::sync::Arc;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    tokens: TokenIssuer,
    password_config: PasswordConfig,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tokens: TokenIssuer,
        password_config: PasswordConfig,
    ) -> Self {
        Self {
            credentials,
            tokens,
            password_config,
        }
    }

    /// Token issuer shared with the request guards
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a new user
    ///
    /// # Returns
    ///
    /// * `Ok(Credential)` - Newly stored credential
    /// * `Err(AppError::DuplicateUsername)` - Username already taken, nothing stored
    /// * `Err(AppError::Internal | AppError::Database)` - Hashing or storage failure,
    ///   including a password longer than the hasher accepts
    pub async fn register(
        &self,
        request: RegisterRequest,
        ctx: &AuditContext,
    ) -> Result<Credential, AppError> {
        let RegisterRequest { username, password } = request;

        let config = self.password_config.clone();
        let hashed = tokio::task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?;

        let password_hash = match hashed {
            Ok(hash) => hash,
            Err(PasswordError::TooLong { max }) => {
                audit_registration_failure(&username, "password too long", ctx);
                return Err(AppError::Internal(format!(
                    "Failed to hash password: longer than {max} bytes"
                )));
            }
            Err(e) => {
                audit_registration_failure(&username, "password hashing failed", ctx);
                return Err(AppError::Internal(format!("Failed to hash password: {e}")));
            }
        };

        match self.credentials.create(&username, &password_hash).await {
            Ok(credential) => {
                tracing::info!(user_id = credential.id, username = %credential.username, "User registered");
                audit_log(&AuditEvent::RegistrationSuccess {
                    user_id: credential.id,
                    username: credential.username.clone(),
                    ip_address: ctx.ip_address.clone(),
                    user_agent: ctx.user_agent.clone(),
                });
                Ok(credential)
            }
            Err(RepositoryError::DuplicateUsername) => {
                audit_registration_failure(&username, "duplicate username", ctx);
                Err(AppError::DuplicateUsername)
            }
            Err(e) => {
                audit_registration_failure(&username, "storage failure", ctx);
                Err(AppError::Database(format!("Failed to create user: {e}")))
            }
        }
    }

    /// Login with username and password
    ///
    /// An unknown username and a wrong password both yield
    /// [`AppError::InvalidCredentials`]; only the audit log tells them apart.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Signed bearer token
    /// * `Err(AppError)` - If login fails
    pub async fn login(&self, request: LoginRequest, ctx: &AuditContext) -> Result<String, AppError> {
        let LoginRequest { username, password } = request;

        let credential = match self.credentials.find_by_username(&username).await {
            Ok(credential) => credential,
            Err(RepositoryError::UserNotFound) => {
                audit_login_failure(&username, "unknown username", ctx);
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                return Err(AppError::Database(format!("Failed to fetch user: {e}")));
            }
        };

        let stored_hash = credential.password_hash;
        let password_valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                .await
                .map_err(|e| AppError::Internal(format!("Password verification task failed: {e}")))?
                .map_err(|e| {
                    audit_login_failure(&username, "stored hash unusable", ctx);
                    AppError::Internal(format!("Failed to verify password: {e}"))
                })?;

        if !password_valid {
            audit_login_failure(&username, "password mismatch", ctx);
            return Err(AppError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&credential.username)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {e}")))?;

        audit_log(&AuditEvent::LoginSuccess {
            username: credential.username,
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        });

        Ok(token)
    }
}

fn audit_registration_failure(username: &str, reason: &str, ctx: &AuditContext) {
    audit_log(&AuditEvent::RegistrationFailure {
        username: username.to_string(),
        reason: reason.to_string(),
        ip_address: ctx.ip_address.clone(),
        user_agent: ctx.user_agent.clone(),
    });
}

fn audit_login_failure(username: &str, reason: &str, ctx: &AuditContext) {
    audit_log(&AuditEvent::LoginFailure {
        username: username.to_string(),
        reason: reason.to_string(),
        ip_address: ctx.ip_address.clone(),
        user_agent: ctx.user_agent.clone(),
    });
}
