/// Request guards for protecting routes
///
/// Protected routes run an ordered [`GuardChain`]. Each guard either lets the
/// request through (possibly attaching data to its extensions) or
/// short-circuits with a response; the first rejection wins.
///
/// [`BearerAuthGuard`] validates the JWT from the Authorization header and
/// attaches an [`AuthenticatedUser`] to the request extensions.
use super::jwt::{Claims, JwtError, TokenIssuer};
use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Authenticated user information extracted from the JWT
///
/// Added to request extensions by [`BearerAuthGuard`]; handlers read it with
/// `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub username: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
        }
    }
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingAuthHeader => "Missing Authorization header",
            AuthError::InvalidAuthHeader => "Invalid Authorization header format",
            AuthError::InvalidToken(_) => "Invalid or expired token",
        };

        (StatusCode::UNAUTHORIZED, Json(ApiError::unauthorized(message))).into_response()
    }
}

/// A single step of a [`GuardChain`]
pub trait RequestGuard: Send + Sync {
    /// Inspect the request. `Err` ends the request with that response.
    fn check(&self, request: &mut Request) -> Result<(), Response>;
}

/// Ordered list of guards applied to a group of routes
#[derive(Clone, Default)]
pub struct GuardChain {
    guards: Vec<Arc<dyn RequestGuard>>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a guard; guards run in insertion order
    pub fn with(mut self, guard: impl RequestGuard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn check(&self, request: &mut Request) -> Result<(), Response> {
        for guard in &self.guards {
            guard.check(request)?;
        }
        Ok(())
    }
}

/// Middleware running a [`GuardChain`] before the handler
///
/// # Usage
///
/// ```ignore
/// use axum::{middleware, routing::get, Router};
/// use hrm_api::auth::middleware::{run_guards, BearerAuthGuard, GuardChain};
///
/// let guards = GuardChain::new().with(BearerAuthGuard::new(tokens));
/// let app = Router::new()
///     .route("/protected", get(protected_handler))
///     .route_layer(middleware::from_fn_with_state(guards, run_guards));
/// ```
pub async fn run_guards(
    State(guards): State<GuardChain>,
    mut request: Request,
    next: Next,
) -> Response {
    match guards.check(&mut request) {
        Ok(()) => next.run(request).await,
        Err(response) => response,
    }
}

/// Requires `Authorization: Bearer <token>` with a valid token
#[derive(Debug, Clone)]
pub struct BearerAuthGuard {
    tokens: TokenIssuer,
}

impl BearerAuthGuard {
    pub fn new(tokens: TokenIssuer) -> Self {
        Self { tokens }
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        let auth_header = headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = bearer_token(auth_header).ok_or(AuthError::InvalidAuthHeader)?;
        let claims = self.tokens.verify(token)?;

        Ok(AuthenticatedUser::from(claims))
    }
}

impl RequestGuard for BearerAuthGuard {
    fn check(&self, request: &mut Request) -> Result<(), Response> {
        match self.authenticate(request.headers()) {
            Ok(user) => {
                tracing::debug!(username = %user.username, "Request authenticated");
                request.extensions_mut().insert(user);
                Ok(())
            }
            Err(err) => {
                audit_log(&AuditEvent::InvalidToken {
                    path: request.uri().path().to_string(),
                    reason: err.to_string(),
                    ip_address: extract_ip_address(request.headers()),
                    user_agent: extract_user_agent(request.headers()),
                });
                Err(err.into_response())
            }
        }
    }
}

/// Token part of a `Bearer` credential; the scheme is case-insensitive
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtConfig;
    use axum::{body::Body, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn tokens() -> TokenIssuer {
        TokenIssuer::new(JwtConfig {
            secret: "guard-test-secret".to_string(),
            ttl_secs: 3600,
            issuer: "hrm-api".to_string(),
        })
    }

    async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> String {
        user.username
    }

    fn app(guards: GuardChain) -> Router {
        Router::new()
            .route("/protected", get(whoami))
            .route_layer(middleware::from_fn_with_state(guards, run_guards))
    }

    fn request(auth: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/protected");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let tokens = tokens();
        let token = tokens.issue("alice").unwrap();
        let app = app(GuardChain::new().with(BearerAuthGuard::new(tokens)));

        let response = app
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "alice");
    }

    #[tokio::test]
    async fn test_rejections_are_unauthorized() {
        let tokens = tokens();
        let expired = format!("Bearer {}", tokens.issue_at("alice", 1_000_000).unwrap());
        let app = app(GuardChain::new().with(BearerAuthGuard::new(tokens)));

        for auth in [
            None,
            Some("Bearer garbage"),
            Some("Basic dXNlcjpwYXNz"),
            Some("Bearer "),
            Some(expired.as_str()),
        ] {
            let response = app.clone().oneshot(request(auth)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "auth: {auth:?}");

            let body: serde_json::Value =
                serde_json::from_str(&body_string(response).await).unwrap();
            assert_eq!(body["code"], "UNAUTHORIZED");
        }
    }

    struct Deny;

    impl RequestGuard for Deny {
        fn check(&self, _request: &mut Request) -> Result<(), Response> {
            Err(StatusCode::FORBIDDEN.into_response())
        }
    }

    struct RequireUser;

    impl RequestGuard for RequireUser {
        fn check(&self, request: &mut Request) -> Result<(), Response> {
            match request.extensions().get::<AuthenticatedUser>() {
                Some(_) => Ok(()),
                None => Err(StatusCode::IM_A_TEAPOT.into_response()),
            }
        }
    }

    #[tokio::test]
    async fn test_chain_short_circuits_in_order() {
        let tokens = tokens();
        let token = tokens.issue("alice").unwrap();
        let app = app(
            GuardChain::new()
                .with(Deny)
                .with(BearerAuthGuard::new(tokens)),
        );

        let response = app
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_later_guards_see_identity() {
        let tokens = tokens();
        let token = tokens.issue("alice").unwrap();
        let chain = GuardChain::new()
            .with(BearerAuthGuard::new(tokens))
            .with(RequireUser);
        assert_eq!(chain.len(), 2);

        let response = app(chain)
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
