//! Authentication API handlers
//!
//! Provides HTTP endpoints for registration, login and the current user.
//!
//! Author: hephaex@gmail.com

use super::extract::ValidatedJson;
use crate::audit::AuditContext;
use crate::auth::{
    AuthenticatedUser, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserInfo,
};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

/// Register a new user account
///
/// # Request Body
///
/// * `username` - Non-empty, unique (case-sensitive)
/// * `password` - Non-empty, at most the configured byte length
///
/// # Responses
///
/// * `201 Created` - User registered
/// * `400 Bad Request` - Missing or empty fields, malformed JSON
/// * `409 Conflict` - Username already exists
/// * `500 Internal Server Error` - Hashing or storage failure
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 409, description = "Username already exists", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext::from_headers(&headers);
    state.auth.register(request, &ctx).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Login with username and password
///
/// The 401 body is the same whether the username is unknown or the
/// password is wrong.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let ctx = AuditContext::from_headers(&headers);
    let token = state.auth.login(request, &ctx).await?;

    Ok(Json(LoginResponse {
        token,
        message: "Login successful".to_string(),
    }))
}

/// Get the user behind the bearer token
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Authenticated user", body = UserInfo),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me_handler(Extension(user): Extension<AuthenticatedUser>) -> Json<UserInfo> {
    Json(UserInfo {
        username: user.username,
    })
}
