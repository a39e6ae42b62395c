// Error Types for the Data Accessor

use thiserror::Error;

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(" [{}]", c)).unwrap_or_default()
}

/// A fetch (`get`, `select`, row scan) failed
///
/// `Clone + PartialEq` so the exact value returned to the caller can also be logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Row not found")]
    NotFound,

    #[error("Database error{}: {message}", code_suffix(.code))]
    Database {
        code: Option<String>,
        message: String,
    },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// A statement execution failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("Database error{}: {message}", code_suffix(.code))]
    Database {
        code: Option<String>,
        message: String,
    },

    #[error("Connection error: {0}")]
    Connection(String),
}
