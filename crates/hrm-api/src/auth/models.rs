//! Data structures for the authentication flow
//!
//! - Credential: stored username and password hash
//! - Request and response bodies for register, login and the current user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Stored credential
///
/// Maps to the `users` table. Created at registration and never changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,

    /// Unique login name, compared case-sensitively
    pub username: String,

    /// Argon2id PHC string, never the plaintext.
    /// This field is never serialized in API responses
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "alice")]
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,

    #[schema(example = "secret123")]
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,

    #[schema(example = "secret123")]
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "User registered successfully")]
    pub message: String,
}

/// Login response with the bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    #[schema(example = "Login successful")]
    pub message: String,
}

/// Identity behind the presented bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    #[schema(example = "alice")]
    pub username: String,
}
