use sqlx::sqlite::{SqliteArguments, SqliteQueryResult, SqliteRow};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use ecorewards_domain::shared::DomainError;

/// Shared plumbing for SQLite repositories: holds the pool and maps sqlx
/// errors into DomainError with an operation label.
pub struct SqliteRepositoryBase {
    pool: Arc<SqlitePool>,
}

impl SqliteRepositoryBase {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn execute<'a>(
        &self,
        query: sqlx::query::Query<'a, sqlx::Sqlite, SqliteArguments<'a>>,
        operation: &str,
    ) -> Result<SqliteQueryResult, DomainError> {
        query
            .execute(&*self.pool)
            .await
            .map_err(|e| DomainError::Repository(format!("{operation}: {e}")))
    }

    pub async fn fetch_optional<'a, T>(
        &self,
        query: sqlx::query::QueryAs<'a, sqlx::Sqlite, T, SqliteArguments<'a>>,
        operation: &str,
    ) -> Result<Option<T>, DomainError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        query
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| DomainError::Repository(format!("{operation}: {e}")))
    }

    pub async fn fetch_all<'a, T>(
        &self,
        query: sqlx::query::QueryAs<'a, sqlx::Sqlite, T, SqliteArguments<'a>>,
        operation: &str,
    ) -> Result<Vec<T>, DomainError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| DomainError::Repository(format!("{operation}: {e}")))
    }
}
