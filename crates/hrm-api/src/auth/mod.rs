//! Authentication and authorization module
//!
//! JWT-based authentication with the following components:
//! - Password hashing with Argon2id
//! - Credential storage with username uniqueness
//! - Token issuing and verification
//! - Registration and login service
//! - Request guards for protected routes

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;

pub use jwt::{Claims, JwtConfig, JwtError, TokenIssuer};
pub use middleware::{
    run_guards, AuthError, AuthenticatedUser, BearerAuthGuard, GuardChain, RequestGuard,
};
pub use models::{
    Credential, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserInfo,
};
pub use password::{hash_password, verify_password, PasswordConfig, PasswordError};
pub use repository::{
    CredentialStore, InMemoryCredentialStore, PgCredentialStore, RepositoryError,
};
pub use service::AuthService;
