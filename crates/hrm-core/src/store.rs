//! Employee storage
//!
//! Provides the employee repository trait with a PostgreSQL implementation
//! (SQLx) and an in-memory implementation used by tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{Employee, EmployeeInput, HrmError, Result, SalaryMetrics};

/// Trait for employee storage operations
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Insert a new employee and return the stored record
    async fn create(&self, input: &EmployeeInput) -> Result<Employee>;

    /// List all live employees ordered by id
    async fn list(&self) -> Result<Vec<Employee>>;

    /// Get employee by id
    async fn get(&self, id: i64) -> Result<Option<Employee>>;

    /// Replace the fields of an existing employee.
    ///
    /// Returns `None` if the employee does not exist.
    async fn update(&self, id: i64, input: &EmployeeInput) -> Result<Option<Employee>>;

    /// Delete employee (soft delete). Returns `false` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Min/max/avg gross salary for a country, `None` when no employee matches
    async fn salary_metrics_by_country(&self, country: &str) -> Result<Option<SalaryMetrics>>;

    /// Average gross salary for a job title, `None` when no employee matches
    async fn average_salary_by_job_title(&self, job_title: &str) -> Result<Option<f64>>;
}

/// PostgreSQL employee store
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Employee row from database
#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: i64,
    full_name: String,
    job_title: String,
    country: String,
    gross_salary: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            full_name: row.full_name,
            job_title: row.job_title,
            country: row.country,
            gross_salary: row.gross_salary,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeStore {
    async fn create(&self, input: &EmployeeInput) -> Result<Employee> {
        let row: EmployeeRow = sqlx::query_as(
            r#"
            INSERT INTO employees (full_name, job_title, country, gross_salary)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, job_title, country, gross_salary, created_at, updated_at
            "#,
        )
        .bind(&input.full_name)
        .bind(&input.job_title)
        .bind(&input.country)
        .bind(input.gross_salary)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| HrmError::DatabaseError(format!("Failed to create employee: {e}")))?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Employee>> {
        let rows: Vec<EmployeeRow> = sqlx::query_as(
            r#"
            SELECT id, full_name, job_title, country, gross_salary, created_at, updated_at
            FROM employees
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HrmError::DatabaseError(format!("Failed to list employees: {e}")))?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Employee>> {
        let row: Option<EmployeeRow> = sqlx::query_as(
            r#"
            SELECT id, full_name, job_title, country, gross_salary, created_at, updated_at
            FROM employees
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| HrmError::DatabaseError(format!("Failed to get employee: {e}")))?;

        Ok(row.map(Employee::from))
    }

    async fn update(&self, id: i64, input: &EmployeeInput) -> Result<Option<Employee>> {
        let row: Option<EmployeeRow> = sqlx::query_as(
            r#"
            UPDATE employees SET
                full_name = $2,
                job_title = $3,
                country = $4,
                gross_salary = $5,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, full_name, job_title, country, gross_salary, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.full_name)
        .bind(&input.job_title)
        .bind(&input.country)
        .bind(input.gross_salary)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| HrmError::DatabaseError(format!("Failed to update employee: {e}")))?;

        Ok(row.map(Employee::from))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE employees SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| HrmError::DatabaseError(format!("Failed to delete employee: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn salary_metrics_by_country(&self, country: &str) -> Result<Option<SalaryMetrics>> {
        // COUNT(*) distinguishes "no rows" from a real zero aggregate
        let (count, min, max, avg): (i64, Option<f64>, Option<f64>, Option<f64>) =
            sqlx::query_as(
                r#"
                SELECT COUNT(*), MIN(gross_salary), MAX(gross_salary), AVG(gross_salary)
                FROM employees
                WHERE country = $1 AND deleted_at IS NULL
                "#,
            )
            .bind(country)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| HrmError::DatabaseError(format!("Failed to aggregate salaries: {e}")))?;

        if count == 0 {
            return Ok(None);
        }

        Ok(Some(SalaryMetrics {
            min_salary: min.unwrap_or_default(),
            max_salary: max.unwrap_or_default(),
            avg_salary: avg.unwrap_or_default(),
        }))
    }

    async fn average_salary_by_job_title(&self, job_title: &str) -> Result<Option<f64>> {
        let (count, avg): (i64, Option<f64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), AVG(gross_salary)
            FROM employees
            WHERE job_title = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(job_title)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| HrmError::DatabaseError(format!("Failed to aggregate salaries: {e}")))?;

        Ok((count > 0).then(|| avg.unwrap_or_default()))
    }
}

/// In-memory employee store
///
/// Keeps records in an ordered map behind an async lock. Deleted records are
/// dropped instead of being marked.
#[derive(Default)]
pub struct InMemoryEmployeeStore {
    inner: RwLock<InMemoryEmployees>,
}

#[derive(Default)]
struct InMemoryEmployees {
    next_id: i64,
    rows: BTreeMap<i64, Employee>,
}

impl InMemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryEmployees {
    fn salaries(&self, matches: impl Fn(&Employee) -> bool) -> Vec<f64> {
        self.rows
            .values()
            .filter(|e| matches(e))
            .map(|e| e.gross_salary)
            .collect()
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeStore {
    async fn create(&self, input: &EmployeeInput) -> Result<Employee> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let now = Utc::now();
        let employee = Employee {
            id: inner.next_id,
            full_name: input.full_name.clone(),
            job_title: input.job_title.clone(),
            country: input.country.clone(),
            gross_salary: input.gross_salary,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(employee.id, employee.clone());

        Ok(employee)
    }

    async fn list(&self) -> Result<Vec<Employee>> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Employee>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, id: i64, input: &EmployeeInput) -> Result<Option<Employee>> {
        let mut inner = self.inner.write().await;
        let Some(employee) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };

        employee.full_name = input.full_name.clone();
        employee.job_title = input.job_title.clone();
        employee.country = input.country.clone();
        employee.gross_salary = input.gross_salary;
        employee.updated_at = Utc::now();

        Ok(Some(employee.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn salary_metrics_by_country(&self, country: &str) -> Result<Option<SalaryMetrics>> {
        let inner = self.inner.read().await;
        let salaries = inner.salaries(|e| e.country == country);

        if salaries.is_empty() {
            return Ok(None);
        }

        let min_salary = salaries.iter().copied().fold(f64::INFINITY, f64::min);
        let max_salary = salaries.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg_salary = salaries.iter().sum::<f64>() / salaries.len() as f64;

        Ok(Some(SalaryMetrics {
            min_salary,
            max_salary,
            avg_salary,
        }))
    }

    async fn average_salary_by_job_title(&self, job_title: &str) -> Result<Option<f64>> {
        let inner = self.inner.read().await;
        let salaries = inner.salaries(|e| e.job_title == job_title);

        if salaries.is_empty() {
            return Ok(None);
        }

        Ok(Some(salaries.iter().sum::<f64>() / salaries.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, title: &str, country: &str, salary: f64) -> EmployeeInput {
        EmployeeInput {
            full_name: name.to_string(),
            job_title: title.to_string(),
            country: country.to_string(),
            gross_salary: salary,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryEmployeeStore::new();

        let created = store
            .create(&input("Ada", "Engineer", "India", 1000.0))
            .await
            .unwrap();
        assert_eq!(created.id, 1);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        assert!(store.get(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let store = InMemoryEmployeeStore::new();
        for name in ["a", "b", "c"] {
            store.create(&input(name, "Engineer", "India", 1.0)).await.unwrap();
        }

        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryEmployeeStore::new();
        let created = store
            .create(&input("Ada", "Engineer", "India", 1000.0))
            .await
            .unwrap();

        let updated = store
            .update(created.id, &input("Ada L.", "Manager", "Japan", 2000.0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.full_name, "Ada L.");
        assert_eq!(updated.gross_salary, 2000.0);
        assert_eq!(updated.created_at, created.created_at);

        assert!(store.update(99, &input("x", "y", "z", 1.0)).await.unwrap().is_none());

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_salary_metrics_by_country() {
        let store = InMemoryEmployeeStore::new();
        store.create(&input("a", "Engineer", "India", 100.0)).await.unwrap();
        store.create(&input("b", "Engineer", "India", 300.0)).await.unwrap();
        store.create(&input("c", "Engineer", "Japan", 900.0)).await.unwrap();

        let metrics = store.salary_metrics_by_country("India").await.unwrap().unwrap();
        assert_eq!(metrics.min_salary, 100.0);
        assert_eq!(metrics.max_salary, 300.0);
        assert_eq!(metrics.avg_salary, 200.0);

        assert!(store.salary_metrics_by_country("Peru").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_average_is_a_result() {
        let store = InMemoryEmployeeStore::new();
        store.create(&input("intern", "Intern", "India", 0.0)).await.unwrap();

        assert_eq!(
            store.average_salary_by_job_title("Intern").await.unwrap(),
            Some(0.0)
        );
        assert_eq!(store.average_salary_by_job_title("Chef").await.unwrap(), None);

        let metrics = store.salary_metrics_by_country("India").await.unwrap();
        assert_eq!(
            metrics,
            Some(SalaryMetrics {
                min_salary: 0.0,
                max_salary: 0.0,
                avg_salary: 0.0,
            })
        );
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_pg_soft_delete_hides_employee() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let pool = PgPool::connect(&url).await.unwrap();
        crate::run_migrations(&pool).await.unwrap();

        let store = PgEmployeeStore::from_pool(pool);
        let country = format!("Testland-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());

        let created = store
            .create(&input("Ada", "Engineer", &country, 500.0))
            .await
            .unwrap();
        assert!(store.salary_metrics_by_country(&country).await.unwrap().is_some());

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert_eq!(store.get(created.id).await.unwrap(), None);
        assert_eq!(store.salary_metrics_by_country(&country).await.unwrap(), None);
    }
}
