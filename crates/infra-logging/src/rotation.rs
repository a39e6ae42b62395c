// Size-Rotated Log File
// Rotation is log4rs's compound policy: size trigger + fixed-window roller (gzip when compressing)
// Backups are <stem>.1<ext> (newest) .. <stem>.N<ext>, with `.gz` appended when compressed

use crate::config::LogConfig;
use crate::error::{LogError, Result};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::roll::Roll;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::Append;
use log4rs::encode::pattern::PatternEncoder;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Index of the newest backup
const FIRST_BACKUP: u32 = 1;

/// Window used when every backup is kept
const UNBOUNDED_BACKUPS: u32 = 1024;

const SECS_PER_DAY: u64 = 24 * 60 * 60;
const GZ_SUFFIX: &str = ".gz";

/// When to rotate and what to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Bytes the active file may exceed before it is rotated
    pub max_size: u64,
    /// Backups kept, newest first (0 = keep all)
    pub max_backups: usize,
    /// Backups last written longer ago than this are deleted
    pub max_age: Option<Duration>,
    /// Gzip backups (on the roller's background thread)
    pub compress: bool,
}

impl RotationPolicy {
    pub fn from_config(config: &LogConfig) -> Self {
        Self {
            max_size: config.max_size_bytes(),
            max_backups: config.max_backups,
            max_age: (config.max_age > 0)
                .then(|| Duration::from_secs(config.max_age.saturating_mul(SECS_PER_DAY))),
            compress: config.compress,
        }
    }

    fn window(&self) -> u32 {
        match u32::try_from(self.max_backups) {
            Ok(0) | Err(_) => UNBOUNDED_BACKUPS,
            Ok(n) => n.min(UNBOUNDED_BACKUPS),
        }
    }
}

/// Where the backups of one log file live and how they are named
#[derive(Debug, Clone)]
struct BackupSet {
    dir: PathBuf,
    stem: String,
    ext: String,
    compress: bool,
}

impl BackupSet {
    fn new(path: &Path, compress: bool) -> Self {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self {
            dir,
            stem,
            ext,
            compress,
        }
    }

    /// Fixed-window roller pattern, e.g. `logs/sqlog.{}.log.gz`
    fn pattern(&self) -> String {
        let suffix = if self.compress { GZ_SUFFIX } else { "" };
        let name = format!("{}.{{}}{}{}", self.stem, self.ext, suffix);
        self.dir.join(name).to_string_lossy().into_owned()
    }

    /// Window index of `name` if it is one of our backups
    fn index_of(&self, name: &str) -> Option<u32> {
        let name = name.strip_suffix(GZ_SUFFIX).unwrap_or(name);
        name.strip_prefix(self.stem.as_str())?
            .strip_prefix('.')?
            .strip_suffix(self.ext.as_str())?
            .parse()
            .ok()
    }

    /// Existing backups, newest first
    fn list(&self) -> io::Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(index) = self.index_of(&name) {
                found.push((index, entry.path()));
            }
        }
        found.sort();
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }

    fn remove_older_than(&self, max_age: Duration) -> io::Result<()> {
        let now = SystemTime::now();
        for path in self.list()? {
            let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(modified) => modified,
                // Moved by a rotation still in flight
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            let age = now.duration_since(modified).unwrap_or_default();
            if age > max_age {
                match fs::remove_file(&path) {
                    Ok(()) => {
                        tracing::debug!(backup = %path.display(), "Removed expired log backup")
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }
}

/// Fixed-window roller that first drops backups older than `max_age`
#[derive(Debug)]
struct ExpiringRoller {
    inner: FixedWindowRoller,
    backups: BackupSet,
    max_age: Option<Duration>,
}

impl Roll for ExpiringRoller {
    fn roll(&self, file: &Path) -> anyhow::Result<()> {
        if let Some(max_age) = self.max_age {
            if let Err(e) = self.backups.remove_older_than(max_age) {
                tracing::warn!(
                    dir = %self.backups.dir.display(),
                    error = %e,
                    "Failed to remove expired log backups"
                );
            }
        }
        self.inner.roll(file)
    }
}

/// Append-only log file rotated once it grows past `max_size`
///
/// Each `append` is one whole record; rotation happens between records.
#[derive(Debug)]
pub struct RotatingFile {
    appender: RollingFileAppender,
    backups: BackupSet,
}

impl RotatingFile {
    /// Open (or create, with parent directories) the active file in append mode
    pub fn open(path: &Path, policy: &RotationPolicy) -> Result<Self> {
        let backups = BackupSet::new(path, policy.compress);

        let roller = FixedWindowRoller::builder()
            .base(FIRST_BACKUP)
            .build(&backups.pattern(), policy.window())
            .map_err(|e| LogError::Config(format!("log backup pattern: {}", e)))?;
        let roller = ExpiringRoller {
            inner: roller,
            backups: backups.clone(),
            max_age: policy.max_age,
        };
        let trigger = SizeTrigger::new(policy.max_size);

        let appender = RollingFileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{m}")))
            .append(true)
            .build(path, Box::new(CompoundPolicy::new(Box::new(trigger), Box::new(roller))))?;

        Ok(Self { appender, backups })
    }

    /// Write one encoded record, rotating afterwards if the file is now over its limit
    pub fn append(&self, line: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(line);
        self.appender
            .append(&log::Record::builder().args(format_args!("{}", text)).build())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }

    pub fn flush(&self) -> io::Result<()> {
        self.appender.flush();
        Ok(())
    }
}

// Lets a tracing-appender worker drive the file; one `write` is one record
impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.appender.flush();
        Ok(())
    }
}
