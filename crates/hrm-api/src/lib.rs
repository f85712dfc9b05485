//! HRM API - REST server for employee records
//!
//! Provides HTTP endpoints for registration and login, and token-protected
//! endpoints for employee records and salary queries.
//!
//! Author: hephaex@gmail.com

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use handlers::health;
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(title = "HRM API", description = "Employee records with token authentication"),
    paths(
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::auth::register_handler,
        handlers::auth::login_handler,
        handlers::auth::me_handler,
        handlers::employees::create_employee,
        handlers::employees::list_employees,
        handlers::employees::get_employee,
        handlers::employees::update_employee,
        handlers::employees::delete_employee,
        handlers::employees::net_salary,
        handlers::employees::salary_metrics_by_country,
        handlers::employees::average_salary_by_job_title,
    ),
    components(schemas(
        error::ApiError,
        auth::RegisterRequest,
        auth::RegisterResponse,
        auth::LoginRequest,
        auth::LoginResponse,
        auth::UserInfo,
        hrm_core::Employee,
        hrm_core::EmployeeInput,
        hrm_core::NetSalary,
        hrm_core::SalaryMetrics,
        handlers::employees::JobTitleSalary,
        handlers::health::HealthResponse,
        handlers::health::ReadinessResponse,
        handlers::health::ReadinessChecks,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Registration and login"),
        (name = "employees", description = "Employee records"),
        (name = "salary", description = "Salary calculations and metrics"),
        (name = "health", description = "Liveness and readiness"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let guards = state.guard_chain();
    let server = &state.config.server;
    let body_limit = server.max_body_size;
    let cors = cors_layer(&server.cors_origins);

    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", routes::api_routes(guards))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// CORS for the configured origins; `None` when no origin is configured
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    )
}

/// Router over in-memory stores with cheap password hashing, for tests
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    create_router(Arc::new(testing_state(hrm_core::AppConfig::default())))
}

/// In-memory state for tests; the hashing cost is lowered to keep tests fast
#[cfg(any(test, feature = "test-utils"))]
pub fn testing_state(mut config: hrm_core::AppConfig) -> AppState {
    config.auth.jwt_secret = "test-secret-for-integration-tests".to_string();
    config.auth.hash_memory_kib = 1024;
    config.auth.hash_time_cost = 1;
    config.auth.hash_parallelism = 1;

    AppState::with_stores(
        config,
        Arc::new(auth::InMemoryCredentialStore::new()),
        Arc::new(hrm_core::InMemoryEmployeeStore::new()),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();

        assert!(json.contains("/api/v1/users/register"));
        assert!(json.contains("/api/v1/employees/{id}/salary/net"));
        assert!(json.contains("bearer_auth"));
    }

    #[test]
    fn test_cors_layer_from_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["http://localhost:3000".to_string()]).is_some());
    }
}
