// Port Layer - Interfaces for external dependencies

pub mod logger;

// Re-exports
pub use logger::{Field, Level, Logger};
