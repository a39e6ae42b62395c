// Logger Factory
// One sink per factory; every logger handed out shares it and differs only by label

use crate::config::LogConfig;
use crate::encoding::{encode_record, RecordMeta};
use crate::error::Result;
use crate::sink::Sink;
use sqlog_core::port::{Field, Level, Logger};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::Location;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;

/// Records less severe than this are dropped
const MIN_LEVEL: LevelFilter = LevelFilter::INFO;

/// Builds the console + rotated-file sink once and hands out labeled loggers
///
/// # Example
/// ```no_run
/// use sqlog_core::port::{Field, Logger};
/// use sqlog_infra_logging::{LogConfig, LogFactory};
///
/// let factory = LogFactory::new(LogConfig::new("logs/app.log", 100, 5, 30, true)).unwrap();
/// let logger = factory.sql_logger();
/// logger.info("connected", &[Field::string("db", "app.db")]);
/// ```
pub struct LogFactory {
    sink: Arc<Sink>,
}

impl LogFactory {
    pub fn new(config: LogConfig) -> Result<Self> {
        let sink = Arc::new(Sink::open(&config)?);
        Ok(Self { sink })
    }

    /// Logger whose records carry `"logger": name`
    pub fn logger(&self, name: impl Into<String>) -> StructuredLogger {
        StructuredLogger {
            name: Arc::from(name.into()),
            sink: self.sink.clone(),
        }
    }

    /// General-purpose application logger
    pub fn std_logger(&self) -> StructuredLogger {
        self.logger("std")
    }

    /// Logger for the data accessor
    pub fn sql_logger(&self) -> StructuredLogger {
        self.logger("sql")
    }

    /// Logger for gateway / edge components
    pub fn gateway_logger(&self) -> StructuredLogger {
        self.logger("gateway")
    }

    /// Flush both sinks; returns the first write failure since the previous flush
    pub fn flush(&self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}

/// Logger writing JSON lines to the factory's sink
#[derive(Clone)]
pub struct StructuredLogger {
    name: Arc<str>,
    sink: Arc<Sink>,
}

impl Logger for StructuredLogger {
    fn log(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) {
        if level > MIN_LEVEL {
            return;
        }

        let stacktrace = if level == Level::ERROR {
            let trace = Backtrace::capture();
            (trace.status() == BacktraceStatus::Captured).then(|| trace.to_string())
        } else {
            None
        };

        let meta = RecordMeta {
            time: chrono::Utc::now(),
            level,
            logger: &self.name,
            caller,
            message,
        };
        let line = encode_record(&meta, fields, stacktrace.as_deref());
        self.sink.write_record(&line);
    }
}
