//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::auth::{run_guards, GuardChain};
use crate::handlers::{auth, employees};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create API v1 routes
pub fn api_routes(guards: GuardChain) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/users/register", post(auth::register_handler))
        .route("/users/login", post(auth::login_handler));

    // Protected routes (guard chain runs first)
    let protected_routes = Router::new()
        .route("/users/me", get(auth::me_handler))
        .route(
            "/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/employees/:id",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route("/employees/:id/salary/net", get(employees::net_salary))
        .route(
            "/metrics/salary/country",
            get(employees::salary_metrics_by_country),
        )
        .route(
            "/metrics/salary/job-title",
            get(employees::average_salary_by_job_title),
        )
        .route_layer(middleware::from_fn_with_state(guards, run_guards));

    Router::new().merge(public_routes).merge(protected_routes)
}
