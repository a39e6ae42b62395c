// Logger Port (Interface)
// Leveled, structured records: a message plus ordered key-value fields

use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Display;
use std::panic::Location;
use std::sync::Arc;

pub use tracing::Level;

/// One key-value pair attached to a log record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Cow<'static, str>,
    pub value: serde_json::Value,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<Cow<'static, str>>, value: &str) -> Self {
        Self::new(key, serde_json::Value::String(value.to_string()))
    }

    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self::new(key, serde_json::Value::from(value))
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        Self::new(key, serde_json::Value::Bool(value))
    }

    /// Positional SQL arguments, rendered as a JSON array
    pub fn args(key: impl Into<Cow<'static, str>>, args: &[crate::Value]) -> Self {
        Self::any(key, &args)
    }

    /// The `error` field: the error's display text, or `null` when there is none
    pub fn error<E: Display + ?Sized>(err: Option<&E>) -> Self {
        let value = match err {
            Some(e) => serde_json::Value::String(e.to_string()),
            None => serde_json::Value::Null,
        };
        Self::new("error", value)
    }

    /// Any serializable value; serialization failures are rendered in place
    pub fn any<T: Serialize + ?Sized>(key: impl Into<Cow<'static, str>>, value: &T) -> Self {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|e| serde_json::Value::String(format!("<unserializable: {}>", e)));
        Self::new(key, value)
    }
}

/// Logger interface
///
/// Implementations:
/// - StructuredLogger (infra-logging): JSON lines to console + rotated file
/// - TracingLogger (infra-logging): forwards to the active `tracing` dispatcher
/// - mocks::RecordingLogger: keeps records in memory for assertions
pub trait Logger: Send + Sync {
    /// Emit one record. `caller` is the source location that produced it.
    fn log(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    );

    #[track_caller]
    fn info(&self, message: &str, fields: &[Field]) {
        self.log(Level::INFO, message, fields, Location::caller());
    }

    #[track_caller]
    fn error(&self, message: &str, fields: &[Field]) {
        self.log(Level::ERROR, message, fields, Location::caller());
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) {
        (**self).log(level, message, fields, caller);
    }
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn log(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) {
        (**self).log(level, message, fields, caller);
    }
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) {
        (**self).log(level, message, fields, caller);
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// A record captured by `RecordingLogger`
    #[derive(Debug, Clone)]
    pub struct CapturedRecord {
        pub level: Level,
        pub message: String,
        pub fields: Vec<Field>,
        pub file: &'static str,
        pub line: u32,
    }

    impl CapturedRecord {
        /// Value of the first field named `key`
        pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
            self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
        }

        pub fn has_field(&self, key: &str) -> bool {
            self.field(key).is_some()
        }
    }

    /// Logger that keeps every record in memory
    #[derive(Default)]
    pub struct RecordingLogger {
        records: Mutex<Vec<CapturedRecord>>,
    }

    impl RecordingLogger {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn records(&self) -> Vec<CapturedRecord> {
            self.records.lock().unwrap().clone()
        }

        pub fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// The only captured record; panics unless exactly one was emitted
        pub fn single(&self) -> CapturedRecord {
            let records = self.records.lock().unwrap();
            assert_eq!(records.len(), 1, "expected exactly one record, got {:?}", *records);
            records[0].clone()
        }
    }

    impl Logger for RecordingLogger {
        fn log(
            &self,
            level: Level,
            message: &str,
            fields: &[Field],
            caller: &'static Location<'static>,
        ) {
            self.records.lock().unwrap().push(CapturedRecord {
                level,
                message: message.to_string(),
                fields: fields.to_vec(),
                file: caller.file(),
                line: caller.line(),
            });
        }
    }
}
