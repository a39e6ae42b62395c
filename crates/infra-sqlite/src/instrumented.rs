// Instrumented Data Accessor
// Every call is forwarded unchanged, timed, and reported in exactly one log record

use crate::executor::{RowHandle, SqlExecutor};
use async_trait::async_trait;
use sqlog_core::{ExecError, ExecResult, Field, Logger, QueryError, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Get,
    Select,
    QueryRow,
    Exec,
}

impl Operation {
    fn message(self) -> &'static str {
        match self {
            Operation::Get => "sql get",
            Operation::Select => "sql select",
            Operation::QueryRow => "sql query_row",
            Operation::Exec => "sql exec",
        }
    }
}

/// One call in flight: what was asked and when it started
struct Invocation<'a> {
    operation: Operation,
    query: &'a str,
    args: &'a [Value],
    started: Instant,
}

impl<'a> Invocation<'a> {
    fn start(operation: Operation, query: &'a str, args: &'a [Value]) -> Self {
        Self {
            operation,
            query,
            args,
            started: Instant::now(),
        }
    }

    /// Emit the record. `error` is `None` when the operation has no error to report.
    fn finish<L: Logger>(self, logger: &L, error: Option<Field>) {
        let cost = self.started.elapsed().as_millis() as i64;

        let mut fields = Vec::with_capacity(4);
        fields.push(Field::string("query", self.query));
        fields.push(Field::args("args", self.args));
        if let Some(error) = error {
            fields.push(error);
        }
        fields.push(Field::int("cost", cost));

        logger.info(self.operation.message(), &fields);
    }
}

/// SqlExecutor decorator that logs query, args, error and cost of every call
///
/// Results and errors of `inner` are returned untouched. No locking, no
/// retries: concurrency safety is exactly that of `inner` and `logger`.
pub struct InstrumentedExecutor<E, L> {
    inner: E,
    logger: L,
}

impl<E, L> InstrumentedExecutor<E, L>
where
    E: SqlExecutor,
    L: Logger,
{
    pub fn new(inner: E, logger: L) -> Self {
        Self { inner, logger }
    }
}

#[async_trait]
impl<E, L> SqlExecutor for InstrumentedExecutor<E, L>
where
    E: SqlExecutor,
    L: Logger,
{
    async fn get<T>(&self, query: &str, args: &[Value]) -> Result<T, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let call = Invocation::start(Operation::Get, query, args);
        let result = self.inner.get::<T>(query, args).await;
        call.finish(&self.logger, Some(Field::error(result.as_ref().err())));
        result
    }

    async fn select<T>(&self, query: &str, args: &[Value]) -> Result<Vec<T>, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let call = Invocation::start(Operation::Select, query, args);
        let result = self.inner.select::<T>(query, args).await;
        call.finish(&self.logger, Some(Field::error(result.as_ref().err())));
        result
    }

    async fn query_row(&self, query: &str, args: &[Value]) -> RowHandle {
        let call = Invocation::start(Operation::QueryRow, query, args);
        let row = self.inner.query_row(query, args).await;
        call.finish(&self.logger, None);
        row
    }

    async fn exec(&self, query: &str, args: &[Value]) -> Result<ExecResult, ExecError> {
        let call = Invocation::start(Operation::Exec, query, args);
        let result = self.inner.exec(query, args).await;
        call.finish(&self.logger, Some(Field::error(result.as_ref().err())));
        result
    }
}
