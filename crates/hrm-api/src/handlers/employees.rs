//! Employee and salary handlers
//!
//! All routes here sit behind the bearer guard.
//!
//! Author: hephaex@gmail.com

use super::extract::{ValidPath, ValidatedJson};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hrm_core::{Employee, EmployeeInput, NetSalary, SalaryMetrics};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Query for country salary metrics
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CountryQuery {
    /// Country name, exact match
    pub country: Option<String>,
}

/// Query for job title salary average
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JobTitleQuery {
    /// Job title, exact match
    pub job_title: Option<String>,
}

/// Average salary for a job title
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobTitleSalary {
    pub job_title: String,
    pub average_salary: f64,
}

/// Required, non-blank query parameter
fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!(
            "query parameter '{name}' is required"
        ))),
    }
}

fn employee_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Employee {id}"))
}

/// Create an employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    tag = "employees",
    request_body = EmployeeInput,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<EmployeeInput>,
) -> Result<impl IntoResponse, AppError> {
    let employee = state.employees.create(&input).await?;
    tracing::info!(employee_id = employee.id, "Employee created");

    Ok((StatusCode::CREATED, Json(employee)))
}

/// List employees ordered by id
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    tag = "employees",
    responses(
        (status = 200, description = "All employees", body = [Employee]),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Employee>>, AppError> {
    Ok(Json(state.employees.list().await?))
}

/// Get an employee by id
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    tag = "employees",
    params(("id" = i64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 400, description = "Malformed id", body = crate::error::ApiError),
        (status = 404, description = "Employee not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<Employee>, AppError> {
    state
        .employees
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| employee_not_found(id))
}

/// Replace the fields of an employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    tag = "employees",
    params(("id" = i64, Path, description = "Employee id")),
    request_body = EmployeeInput,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 404, description = "Employee not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
    ValidatedJson(input): ValidatedJson<EmployeeInput>,
) -> Result<Json<Employee>, AppError> {
    let employee = state
        .employees
        .update(id, &input)
        .await?
        .ok_or_else(|| employee_not_found(id))?;
    tracing::info!(employee_id = id, "Employee updated");

    Ok(Json(employee))
}

/// Delete an employee
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    tag = "employees",
    params(("id" = i64, Path, description = "Employee id")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<StatusCode, AppError> {
    if !state.employees.delete(id).await? {
        return Err(employee_not_found(id));
    }
    tracing::info!(employee_id = id, "Employee deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Net salary after the country deduction
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}/salary/net",
    tag = "salary",
    params(("id" = i64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Net salary", body = NetSalary),
        (status = 404, description = "Employee not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn net_salary(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<NetSalary>, AppError> {
    let employee = state
        .employees
        .get(id)
        .await?
        .ok_or_else(|| employee_not_found(id))?;

    Ok(Json(NetSalary::for_employee(&employee)))
}

/// Min, max and average salary in a country
#[utoipa::path(
    get,
    path = "/api/v1/metrics/salary/country",
    tag = "salary",
    params(CountryQuery),
    responses(
        (status = 200, description = "Salary metrics", body = SalaryMetrics),
        (status = 400, description = "Missing country", body = crate::error::ApiError),
        (status = 404, description = "No employees in country", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn salary_metrics_by_country(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<SalaryMetrics>, AppError> {
    let country = required(query.country, "country")?;

    state
        .employees
        .salary_metrics_by_country(&country)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Employees in country '{country}'")))
}

/// Average salary for a job title
#[utoipa::path(
    get,
    path = "/api/v1/metrics/salary/job-title",
    tag = "salary",
    params(JobTitleQuery),
    responses(
        (status = 200, description = "Average salary", body = JobTitleSalary),
        (status = 400, description = "Missing job title", body = crate::error::ApiError),
        (status = 404, description = "No employees with job title", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn average_salary_by_job_title(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JobTitleQuery>,
) -> Result<Json<JobTitleSalary>, AppError> {
    let job_title = required(query.job_title, "job_title")?;

    let average_salary = state
        .employees
        .average_salary_by_job_title(&job_title)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employees with job title '{job_title}'")))?;

    Ok(Json(JobTitleSalary {
        job_title,
        average_salary,
    }))
}
