// sqlog Core - Ports & Shared Types
// NO infrastructure dependencies: the database adapter and the log sinks live in infra crates

pub mod domain;
pub mod error;
pub mod port;

pub use domain::{ExecResult, Value};
pub use error::{ExecError, QueryError};
pub use port::{Field, Logger};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
