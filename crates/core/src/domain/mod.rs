// Domain Layer - Values that cross the adapter boundary

pub mod exec;
pub mod value;

// Re-exports
pub use exec::ExecResult;
pub use value::Value;
