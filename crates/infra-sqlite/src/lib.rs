// sqlog Infrastructure - SQLite Adapter
// Implements: SqlExecutor over SqlitePool, and the logging decorator over any SqlExecutor

mod bind;
mod connection;
mod error;
mod executor;
mod instrumented;

pub use connection::create_pool;
pub use executor::{RowHandle, SqlExecutor, SqliteExecutor};
pub use instrumented::InstrumentedExecutor;

// Re-exported so callers can name row types without depending on sqlx directly
pub use sqlx::sqlite::{SqlitePool, SqliteRow};
pub use sqlx::FromRow;

// Note: sqlx::Error conversion is handled by helper functions in `error`
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for QueryError here)
