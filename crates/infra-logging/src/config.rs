// Logger Configuration

use crate::error::{LogError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Rotation threshold used when `max_size` is 0 (megabytes)
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

const DEFAULT_LOG_PATH: &str = "logs/sqlog.log";

/// Sink configuration shared by every logger a factory hands out
///
/// Minimum level is not configurable: records below info are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Active log file
    pub path: PathBuf,
    /// Megabytes before the active file is rotated (0 = 100)
    pub max_size: u64,
    /// Rotated files kept (0 = keep all)
    pub max_backups: usize,
    /// Days a rotated file is kept (0 = forever)
    pub max_age: u64,
    /// Gzip rotated files
    pub compress: bool,
    /// Also write every record to stdout
    pub console: bool,
    /// Write the file from a background thread
    pub non_blocking: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            max_size: DEFAULT_MAX_SIZE_MB,
            max_backups: 0,
            max_age: 0,
            compress: false,
            console: true,
            non_blocking: false,
        }
    }
}

impl LogConfig {
    pub fn new(
        path: impl Into<PathBuf>,
        max_size: u64,
        max_backups: usize,
        max_age: u64,
        compress: bool,
    ) -> Self {
        Self {
            path: path.into(),
            max_size,
            max_backups,
            max_age,
            compress,
            ..Default::default()
        }
    }

    /// Defaults overlaid with `SQLOG_LOG_*` environment variables
    ///
    /// # Environment Variables
    ///
    /// - `SQLOG_LOG_PATH`: log file path
    /// - `SQLOG_LOG_MAX_SIZE`: megabytes before rotation
    /// - `SQLOG_LOG_MAX_BACKUPS`: rotated files kept
    /// - `SQLOG_LOG_MAX_AGE`: days rotated files are kept
    /// - `SQLOG_LOG_COMPRESS`: `true` to gzip rotated files
    /// - `SQLOG_LOG_CONSOLE`: `false` to disable stdout
    /// - `SQLOG_LOG_NON_BLOCKING`: `true` to write from a background thread
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("SQLOG_LOG_PATH") {
            config.path = PathBuf::from(path);
        }
        if let Some(v) = parse_var(&lookup, "SQLOG_LOG_MAX_SIZE")? {
            config.max_size = v;
        }
        if let Some(v) = parse_var(&lookup, "SQLOG_LOG_MAX_BACKUPS")? {
            config.max_backups = v;
        }
        if let Some(v) = parse_var(&lookup, "SQLOG_LOG_MAX_AGE")? {
            config.max_age = v;
        }
        if let Some(v) = parse_var(&lookup, "SQLOG_LOG_COMPRESS")? {
            config.compress = v;
        }
        if let Some(v) = parse_var(&lookup, "SQLOG_LOG_CONSOLE")? {
            config.console = v;
        }
        if let Some(v) = parse_var(&lookup, "SQLOG_LOG_NON_BLOCKING")? {
            config.non_blocking = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(LogError::Config("log path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Rotation threshold in bytes
    pub fn max_size_bytes(&self) -> u64 {
        let mb = if self.max_size == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            self.max_size
        };
        mb.saturating_mul(1024 * 1024)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| LogError::Config(format!("{}={:?}: {}", key, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.path, PathBuf::from("logs/sqlog.log"));
        assert_eq!(config.max_size, 100);
        assert_eq!(config.max_backups, 0);
        assert!(config.console);
        assert!(!config.compress);
    }

    #[test]
    fn test_env_overrides() {
        let config = LogConfig::from_lookup(lookup_from(&[
            ("SQLOG_LOG_PATH", "/var/log/app/sql.log"),
            ("SQLOG_LOG_MAX_SIZE", "5"),
            ("SQLOG_LOG_MAX_BACKUPS", "3"),
            ("SQLOG_LOG_MAX_AGE", "7"),
            ("SQLOG_LOG_COMPRESS", "true"),
            ("SQLOG_LOG_CONSOLE", "false"),
        ]))
        .unwrap();

        assert_eq!(config.path, PathBuf::from("/var/log/app/sql.log"));
        assert_eq!(config.max_size, 5);
        assert_eq!(config.max_backups, 3);
        assert_eq!(config.max_age, 7);
        assert!(config.compress);
        assert!(!config.console);
        assert!(!config.non_blocking);
    }

    #[test]
    fn test_invalid_env_value_is_config_error() {
        let err = LogConfig::from_lookup(lookup_from(&[("SQLOG_LOG_MAX_SIZE", "big")]))
            .unwrap_err();
        assert!(matches!(err, LogError::Config(msg) if msg.contains("SQLOG_LOG_MAX_SIZE")));
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = LogConfig::from_lookup(lookup_from(&[("SQLOG_LOG_PATH", "")])).unwrap_err();
        assert!(matches!(err, LogError::Config(_)));
    }

    #[test]
    fn test_zero_max_size_uses_default() {
        let config = LogConfig::new("a.log", 0, 0, 0, false);
        assert_eq!(config.max_size_bytes(), 100 * 1024 * 1024);
        let config = LogConfig::new("a.log", 2, 0, 0, false);
        assert_eq!(config.max_size_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: LogConfig =
            serde_json::from_str(r#"{"path": "x.log", "max_backups": 2}"#).unwrap();
        assert_eq!(config.path, PathBuf::from("x.log"));
        assert_eq!(config.max_backups, 2);
        assert_eq!(config.max_size, 100);
    }
}
