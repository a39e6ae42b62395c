// SqlExecutor Port and its SQLite implementation

use crate::bind::to_arguments;
use crate::error::{map_exec_error, map_query_error};
use async_trait::async_trait;
use sqlog_core::{ExecError, ExecResult, QueryError, Value};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::FromRow;
use std::sync::Arc;

/// Relational query capability
///
/// Implementations:
/// - SqliteExecutor: runs statements on a `SqlitePool`
/// - InstrumentedExecutor: logs every call, then delegates to another executor
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Fetch exactly one row into `T`
    ///
    /// # Errors
    /// - QueryError::NotFound if the query matches no row
    async fn get<T>(&self, query: &str, args: &[Value]) -> Result<T, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin;

    /// Fetch zero or more rows into `Vec<T>`
    async fn select<T>(&self, query: &str, args: &[Value]) -> Result<Vec<T>, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin;

    /// Run a single-row query; any error is deferred to `RowHandle::scan`
    async fn query_row(&self, query: &str, args: &[Value]) -> RowHandle;

    /// Execute a statement
    async fn exec(&self, query: &str, args: &[Value]) -> Result<ExecResult, ExecError>;
}

/// Outcome of `query_row`, consumed by the caller
///
/// The statement has already run; "no row" and query failures surface only
/// when the caller asks for the row.
pub struct RowHandle {
    outcome: Result<Option<SqliteRow>, QueryError>,
}

impl RowHandle {
    pub fn new(outcome: Result<Option<SqliteRow>, QueryError>) -> Self {
        Self { outcome }
    }

    /// Query failure, if any. A missing row is not an error until scanned.
    pub fn err(&self) -> Option<&QueryError> {
        self.outcome.as_ref().err()
    }

    /// The raw row
    ///
    /// # Errors
    /// - QueryError::NotFound if the query matched no row
    /// - the query's own error if it failed
    pub fn row(self) -> Result<SqliteRow, QueryError> {
        self.outcome?.ok_or(QueryError::NotFound)
    }

    /// Decode the row into `T`
    pub fn scan<T>(self) -> Result<T, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        let row = self.row()?;
        T::from_row(&row).map_err(map_query_error)
    }
}

/// SqlExecutor over a `SqlitePool`
#[derive(Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SqlExecutor for SqliteExecutor {
    async fn get<T>(&self, query: &str, args: &[Value]) -> Result<T, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let arguments = to_arguments(args).map_err(map_query_error)?;
        sqlx::query_as_with::<_, T, _>(query, arguments)
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)
    }

    async fn select<T>(&self, query: &str, args: &[Value]) -> Result<Vec<T>, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let arguments = to_arguments(args).map_err(map_query_error)?;
        sqlx::query_as_with::<_, T, _>(query, arguments)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)
    }

    async fn query_row(&self, query: &str, args: &[Value]) -> RowHandle {
        let outcome = match to_arguments(args) {
            Ok(arguments) => sqlx::query_with(query, arguments)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_query_error),
            Err(e) => Err(map_query_error(e)),
        };
        RowHandle::new(outcome)
    }

    async fn exec(&self, query: &str, args: &[Value]) -> Result<ExecResult, ExecError> {
        let arguments = to_arguments(args).map_err(map_exec_error)?;
        let result = sqlx::query_with(query, arguments)
            .execute(&self.pool)
            .await
            .map_err(map_exec_error)?;

        Ok(ExecResult::new(
            result.rows_affected(),
            result.last_insert_rowid(),
        ))
    }
}

#[async_trait]
impl<E: SqlExecutor> SqlExecutor for Arc<E> {
    async fn get<T>(&self, query: &str, args: &[Value]) -> Result<T, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        (**self).get::<T>(query, args).await
    }

    async fn select<T>(&self, query: &str, args: &[Value]) -> Result<Vec<T>, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        (**self).select::<T>(query, args).await
    }

    async fn query_row(&self, query: &str, args: &[Value]) -> RowHandle {
        (**self).query_row(query, args).await
    }

    async fn exec(&self, query: &str, args: &[Value]) -> Result<ExecResult, ExecError> {
        (**self).exec(query, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;
    use sqlog_core::args;

    async fn seeded() -> SqliteExecutor {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let executor = SqliteExecutor::new(pool);
        executor
            .exec("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL)", &[])
            .await
            .unwrap();
        executor
            .exec("INSERT INTO t (id, name) VALUES (?, ?), (?, ?)", &args![1, "a", 2, "b"])
            .await
            .unwrap();
        executor
    }

    #[tokio::test]
    async fn test_get_one_row() {
        let executor = seeded().await;
        let row: (i64, String) = executor
            .get("SELECT id, name FROM t WHERE id = ?", &args![1])
            .await
            .unwrap();
        assert_eq!(row, (1, "a".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_row_is_not_found() {
        let executor = seeded().await;
        let err = executor
            .get::<(i64, String)>("SELECT id, name FROM t WHERE id = ?", &args![99])
            .await
            .unwrap_err();
        assert_eq!(err, QueryError::NotFound);
    }

    #[tokio::test]
    async fn test_select_rows_in_order() {
        let executor = seeded().await;
        let rows: Vec<(i64, String)> = executor
            .select("SELECT id, name FROM t ORDER BY id", &[])
            .await
            .unwrap();
        assert_eq!(rows, vec![(1, "a".to_string()), (2, "b".to_string())]);

        let none: Vec<(i64,)> = executor
            .select("SELECT id FROM t WHERE id > ?", &args![10])
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_query_row_defers_errors() {
        let executor = seeded().await;

        let handle = executor.query_row("SELECT name FROM t WHERE id = ?", &args![2]).await;
        assert!(handle.err().is_none());
        let (name,): (String,) = handle.scan().unwrap();
        assert_eq!(name, "b");

        let missing = executor.query_row("SELECT name FROM t WHERE id = ?", &args![3]).await;
        assert!(missing.err().is_none());
        assert_eq!(missing.scan::<(String,)>().unwrap_err(), QueryError::NotFound);

        let broken = executor.query_row("SELECT nope FROM t", &[]).await;
        assert!(matches!(broken.err(), Some(QueryError::Database { .. })));
    }

    #[tokio::test]
    async fn test_exec_reports_rows_and_last_id() {
        let executor = seeded().await;
        let inserted = executor
            .exec("INSERT INTO t (name) VALUES (?)", &args!["c"])
            .await
            .unwrap();
        assert_eq!(inserted.rows_affected, 1);
        assert_eq!(inserted.last_insert_id, 3);

        let updated = executor
            .exec("UPDATE t SET name = ? WHERE id <= ?", &args!["z", 2])
            .await
            .unwrap();
        assert_eq!(updated.rows_affected, 2);
    }

    #[tokio::test]
    async fn test_exec_constraint_violation_keeps_code() {
        let executor = seeded().await;
        let err = executor
            .exec("INSERT INTO t (id, name) VALUES (?, ?)", &args![1, "dup"])
            .await
            .unwrap_err();
        match err {
            ExecError::Database { code, message } => {
                assert_eq!(code.as_deref(), Some("1555"));
                assert!(message.starts_with("Unique constraint violation"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
