// Console + File Sink
// One encoded record = one write per destination

use crate::config::LogConfig;
use crate::error::Result;
use crate::rotation::{RotatingFile, RotationPolicy};
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};

enum FileSink {
    /// Written on the caller's thread
    Direct(RotatingFile),
    /// Handed to a tracing-appender worker thread; the guard flushes on drop
    Background {
        writer: NonBlocking,
        _guard: WorkerGuard,
    },
}

pub(crate) struct Sink {
    console: bool,
    file: FileSink,
    /// First write failure since the last flush
    failure: Mutex<Option<io::Error>>,
}

impl Sink {
    pub(crate) fn open(config: &LogConfig) -> Result<Self> {
        config.validate()?;
        let rotating = RotatingFile::open(&config.path, &RotationPolicy::from_config(config))?;

        let file = if config.non_blocking {
            let (writer, guard) = NonBlockingBuilder::default()
                .lossy(false)
                .thread_name("sqlog-log-writer")
                .finish(rotating);
            FileSink::Background {
                writer,
                _guard: guard,
            }
        } else {
            FileSink::Direct(rotating)
        };

        tracing::debug!(
            path = %config.path.display(),
            console = config.console,
            non_blocking = config.non_blocking,
            "Log sink opened"
        );

        Ok(Self {
            console: config.console,
            file,
            failure: Mutex::new(None),
        })
    }

    /// Write failures are kept for the next `flush`, not returned to the logging caller
    pub(crate) fn write_record(&self, line: &[u8]) {
        if self.console {
            if let Err(e) = io::stdout().lock().write_all(line) {
                self.remember(e);
            }
        }

        let written = match &self.file {
            FileSink::Direct(file) => file.append(line),
            FileSink::Background { writer, .. } => writer.clone().write_all(line),
        };
        if let Err(e) = written {
            self.remember(e);
        }
    }

    fn remember(&self, err: io::Error) {
        // A panic while holding the lock cannot leave the slot half-written
        let mut failure = self.failure.lock().unwrap_or_else(|p| p.into_inner());
        if failure.is_none() {
            *failure = Some(err);
        }
    }

    /// Flush both destinations, reporting the first write failure since the last flush
    pub(crate) fn flush(&self) -> io::Result<()> {
        if self.console {
            io::stdout().lock().flush()?;
        }
        match &self.file {
            FileSink::Direct(file) => file.flush()?,
            FileSink::Background { writer, .. } => writer.clone().flush()?,
        }

        let failure = self.failure.lock().unwrap_or_else(|p| p.into_inner()).take();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
