// sqlog Infrastructure - Logging Adapter
// Implements: Logger (StructuredLogger, TracingLogger), the sink they write to, and file rotation

mod config;
mod encoding;
mod error;
mod factory;
mod rotation;
mod sink;
mod tracing_logger;

pub use config::LogConfig;
pub use error::LogError;
pub use factory::{LogFactory, StructuredLogger};
pub use tracing_logger::{init_tracing, TracingLogger};
