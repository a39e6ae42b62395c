// Logger -> tracing bridge
// For processes that already own a tracing subscriber and want accessor records routed through it

use crate::encoding::short_caller;
use crate::error::{LogError, Result};
use sqlog_core::port::{Field, Level, Logger};
use std::panic::Location;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "sqlog=info";

/// Logger that emits `tracing` events on the current dispatcher
///
/// Caller fields are rendered as one JSON object in the `fields` attribute.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    name: String,
}

impl TracingLogger {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

fn render_fields(fields: &[Field]) -> String {
    let object: serde_json::Map<String, serde_json::Value> = fields
        .iter()
        .map(|f| (f.key.to_string(), f.value.clone()))
        .collect();
    serde_json::Value::Object(object).to_string()
}

impl Logger for TracingLogger {
    fn log(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) {
        let fields = render_fields(fields);
        let linenum = short_caller(caller);
        let logger = self.name.as_str();

        if level == Level::ERROR {
            tracing::error!(logger, linenum = %linenum, fields = %fields, "{}", message);
        } else if level == Level::WARN {
            tracing::warn!(logger, linenum = %linenum, fields = %fields, "{}", message);
        } else if level == Level::INFO {
            tracing::info!(logger, linenum = %linenum, fields = %fields, "{}", message);
        } else if level == Level::DEBUG {
            tracing::debug!(logger, linenum = %linenum, fields = %fields, "{}", message);
        } else {
            tracing::trace!(logger, linenum = %linenum, fields = %fields, "{}", message);
        }
    }
}

/// Install the global tracing subscriber
///
/// Filter comes from `RUST_LOG`, falling back to `sqlog=info`.
/// `json = true` selects JSON lines; otherwise pretty, human-readable output.
pub fn init_tracing(json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_DIRECTIVE))
        .map_err(|e| LogError::Config(e.to_string()))?;

    if json {
        // Production: JSON structured logging
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| LogError::Subscriber(e.to_string()))
    } else {
        // Development: Pretty formatting
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .try_init()
            .map_err(|e| LogError::Subscriber(e.to_string()))
    }
}
