//! PostgreSQL connection and schema bootstrap

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::{DatabaseConfig, HrmError, Result};

/// Statements applied in order at startup. Each one is idempotent.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id BIGSERIAL PRIMARY KEY,
        full_name TEXT NOT NULL,
        job_title TEXT NOT NULL,
        country TEXT NOT NULL,
        gross_salary DOUBLE PRECISION NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_employees_country ON employees (country) WHERE deleted_at IS NULL",
    "CREATE INDEX IF NOT EXISTS idx_employees_job_title ON employees (job_title) WHERE deleted_at IS NULL",
];

/// Open a connection pool and check that the database answers
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres_pool_size)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.postgres_url)
        .await
        .map_err(|e| HrmError::DatabaseError(format!("PostgreSQL connection failed: {e}")))?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| HrmError::DatabaseError(format!("PostgreSQL ping failed: {e}")))?;

    Ok(pool)
}

/// Create tables and indexes if they do not exist yet
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    for statement in MIGRATIONS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| HrmError::DatabaseError(format!("Migration failed: {e}")))?;
    }

    tracing::info!(statements = MIGRATIONS.len(), "Database migration completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        for statement in MIGRATIONS {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "statement must be re-runnable: {statement}"
            );
        }
    }

    #[test]
    fn test_username_is_unique() {
        let users = MIGRATIONS
            .iter()
            .find(|s| s.contains("TABLE IF NOT EXISTS users"))
            .expect("users table");
        assert!(users.contains("username TEXT NOT NULL UNIQUE"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_migrations_apply_twice() {
        let config = DatabaseConfig {
            postgres_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            ..Default::default()
        };
        let pool = connect_pool(&config).await.unwrap();

        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();
    }
}
