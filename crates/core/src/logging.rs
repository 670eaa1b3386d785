use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoLocal};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const APP_TITLE: &str = "BatchRenamer";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Sink for batch progress messages. The processor receives one at
/// construction instead of reaching for a global handle.
pub trait BatchLogger {
    fn log(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

/// Forwards to whatever `tracing` subscriber the process installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl BatchLogger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        if level == Level::ERROR {
            tracing::error!("{message}");
        } else if level == Level::WARN {
            tracing::warn!("{message}");
        } else if level == Level::INFO {
            tracing::info!("{message}");
        } else if level == Level::DEBUG {
            tracing::debug!("{message}");
        } else {
            tracing::trace!("{message}");
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub log_dir: PathBuf,
    pub print_to_screen: bool,
}

/// Keeps the background log writer alive. Dropping it flushes pending lines,
/// so hold it until shutdown.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _worker: WorkerGuard,
    log_path: PathBuf,
}

impl LogGuard {
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("{APP_TITLE}.log"))
}

/// Installs the process-wide subscriber: an append-only log file, plus stderr
/// when `print_to_screen` is set. Level defaults to `info`, `RUST_LOG`
/// overrides it. Can only succeed once per process.
pub fn init_logging(settings: &LogSettings) -> Result<LogGuard> {
    fs::create_dir_all(&settings.log_dir).with_context(|| {
        format!(
            "could not create log directory: {}",
            settings.log_dir.display()
        )
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(APP_TITLE)
        .filename_suffix("log")
        .build(&settings.log_dir)
        .with_context(|| {
            format!(
                "could not open log file in: {}",
                settings.log_dir.display()
            )
        })?;
    let (writer, worker) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()));
    let console_layer = settings.print_to_screen.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
    });
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("logging was already initialized")?;

    tracing::info!("Logger initiated");

    Ok(LogGuard {
        _worker: worker,
        log_path: log_file_path(&settings.log_dir),
    })
}

/// Span carrying the application name and version; every line logged inside
/// it is tagged with both.
pub fn app_span() -> Span {
    tracing::info_span!("BatchRenamer", version = env!("CARGO_PKG_VERSION"))
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryLogger;
    use super::*;

    #[test]
    fn log_file_lives_in_log_dir() {
        let path = log_file_path(Path::new("/var/log/app"));
        assert_eq!(path, Path::new("/var/log/app/BatchRenamer.log"));
    }

    #[test]
    fn helper_methods_map_to_levels() {
        let logger = MemoryLogger::default();
        logger.info("started");
        logger.warn("nothing to do");
        logger.error("broken");

        assert_eq!(logger.messages_at(Level::INFO), vec!["started"]);
        assert_eq!(logger.messages_at(Level::WARN), vec!["nothing to do"]);
        assert_eq!(logger.messages_at(Level::ERROR), vec!["broken"]);
    }
}
