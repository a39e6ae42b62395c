// sqlx::Error -> QueryError / ExecError

use sqlog_core::{ExecError, QueryError};

/// Database error with SQLite extended code and a descriptive message
fn describe_database_error(db_err: &dyn sqlx::error::DatabaseError) -> (Option<String>, String) {
    let Some(code) = db_err.code() else {
        return (None, db_err.message().to_string());
    };
    let code = code.into_owned();

    // SQLite error codes: https://www.sqlite.org/rescode.html
    let message = match code.as_str() {
        // UNIQUE / PRIMARY KEY constraint failed
        "2067" | "1555" => format!("Unique constraint violation: {}", db_err.message()),
        // FOREIGN KEY constraint failed
        "787" | "3850" => format!("Foreign key constraint violation: {}", db_err.message()),
        // SQLITE_BUSY - database is locked
        "5" => format!("Database locked (SQLITE_BUSY): {}", db_err.message()),
        // SQLITE_FULL - database or disk is full
        "13" => format!("Database full: {}", db_err.message()),
        _ => db_err.message().to_string(),
    };

    (Some(code), message)
}

fn is_connection_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

pub(crate) fn map_query_error(err: sqlx::Error) -> QueryError {
    match &err {
        sqlx::Error::RowNotFound => QueryError::NotFound,
        sqlx::Error::ColumnNotFound(col) => QueryError::ColumnNotFound(col.clone()),
        sqlx::Error::ColumnDecode { index, source } => {
            QueryError::Decode(format!("column {}: {}", index, source))
        }
        sqlx::Error::Decode(source) => QueryError::Decode(source.to_string()),
        sqlx::Error::Database(db_err) => {
            let (code, message) = describe_database_error(&**db_err);
            QueryError::Database { code, message }
        }
        e if is_connection_error(e) => QueryError::Connection(err.to_string()),
        _ => QueryError::Database {
            code: None,
            message: err.to_string(),
        },
    }
}

pub(crate) fn map_exec_error(err: sqlx::Error) -> ExecError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let (code, message) = describe_database_error(&**db_err);
            ExecError::Database { code, message }
        }
        e if is_connection_error(e) => ExecError::Connection(err.to_string()),
        _ => ExecError::Database {
            code: None,
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert_eq!(map_query_error(sqlx::Error::RowNotFound), QueryError::NotFound);
    }

    #[test]
    fn test_pool_errors_are_connection_errors() {
        assert!(matches!(
            map_query_error(sqlx::Error::PoolTimedOut),
            QueryError::Connection(_)
        ));
        assert!(matches!(
            map_exec_error(sqlx::Error::PoolClosed),
            ExecError::Connection(_)
        ));
    }

    #[test]
    fn test_column_not_found_keeps_name() {
        assert_eq!(
            map_query_error(sqlx::Error::ColumnNotFound("name".to_string())),
            QueryError::ColumnNotFound("name".to_string())
        );
    }
}
