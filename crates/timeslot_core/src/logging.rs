//! Logging bootstrap for hosts embedding the slot engine.
//!
//! # Responsibility
//! - Start file-based rolling logs once per process.
//! - Keep library diagnostics metadata-only (`event=... module=... key=value`).
//!
//! # Invariants
//! - Initialization is idempotent for an identical `(level, log_dir)`.
//! - Reconfiguration with a different level or directory is rejected.
//! - Initialization never panics.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "timeslot";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

/// Error raised while starting the file logger.
#[derive(Debug)]
pub enum LoggingError {
    UnknownLevel(String),
    /// Log directory must be a non-empty absolute path.
    InvalidDirectory(PathBuf),
    CreateDirectory {
        path: PathBuf,
        source: io::Error,
    },
    Backend(FlexiLoggerError),
    /// Logging already runs with another level or directory.
    AlreadyConfigured {
        active: String,
        requested: String,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(value) => write!(
                f,
                "unknown log level `{value}`; expected off|error|warn|info|debug|trace"
            ),
            Self::InvalidDirectory(path) => {
                write!(f, "log directory must be absolute, got `{}`", path.display())
            }
            Self::CreateDirectory { path, source } => {
                write!(f, "cannot create log directory `{}`: {source}", path.display())
            }
            Self::Backend(err) => write!(f, "logger backend failed: {err}"),
            Self::AlreadyConfigured { active, requested } => write!(
                f,
                "logging already configured as {active}; refusing {requested}"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            Self::UnknownLevel(_) | Self::InvalidDirectory(_) | Self::AlreadyConfigured { .. } => {
                None
            }
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

struct ActiveLogger {
    level: LevelFilter,
    dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn describe(level: LevelFilter, dir: &Path) -> String {
        format!("level={level} dir={}", dir.display())
    }

    fn accept(&self, level: LevelFilter, dir: &Path) -> Result<(), LoggingError> {
        if self.level == level && self.dir == dir {
            return Ok(());
        }
        Err(LoggingError::AlreadyConfigured {
            active: Self::describe(self.level, &self.dir),
            requested: Self::describe(level, dir),
        })
    }
}

/// Starts rolling file logging at `level` under `log_dir`.
///
/// `level` is parsed case-insensitively as a `log::LevelFilter`.
///
/// # Errors
/// - `LoggingError::UnknownLevel` / `InvalidDirectory` for bad arguments.
/// - `LoggingError::AlreadyConfigured` when logging runs with other settings.
/// - `LoggingError::CreateDirectory` / `Backend` when startup fails.
pub fn init_logging(level: &str, log_dir: impl AsRef<Path>) -> Result<(), LoggingError> {
    let level: LevelFilter = level
        .trim()
        .parse()
        .map_err(|_| LoggingError::UnknownLevel(level.to_string()))?;
    let dir = log_dir.as_ref();
    if dir.as_os_str().is_empty() || !dir.is_absolute() {
        return Err(LoggingError::InvalidDirectory(dir.to_path_buf()));
    }

    ACTIVE_LOGGER
        .get_or_try_init(|| start(level, dir))?
        .accept(level, dir)
}

/// Returns the level and directory of the running logger, if any.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.level, active.dir.clone()))
}

/// Level used when the host has no preference.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn start(level: LevelFilter, dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level.to_string())?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    info!(
        "event=logging_start module=logging status=ok level={} dir={} version={}",
        level,
        dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, LoggingError};
    use crate::grid::generator::make_grid;
    use crate::model::slot::Slot;
    use chrono::Duration;
    use log::LevelFilter;
    use serde_json::Map;

    #[test]
    fn init_logging_rejects_bad_arguments_before_starting() {
        let dir = tempfile::tempdir().unwrap();

        let err = init_logging("verbose", dir.path()).unwrap_err();
        assert!(matches!(err, LoggingError::UnknownLevel(ref level) if level == "verbose"));

        let err = init_logging("info", "logs/dev").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidDirectory(_)));
        let err = init_logging("info", "").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidDirectory(_)));
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let other_dir = tempfile::tempdir().unwrap();

        init_logging("DEBUG", dir.path()).unwrap();
        init_logging(" debug ", dir.path()).unwrap();

        // Library operations log through the active logger.
        let window =
            Slot::parse_rfc3339("2024-03-01T09:00:00Z", "2024-03-01T10:00:00Z", Map::new())
                .unwrap();
        let grid = make_grid(window.start(), window.end(), Duration::minutes(20)).unwrap();
        assert_eq!(grid.len(), 3);

        let err = init_logging("info", dir.path()).unwrap_err();
        assert!(matches!(err, LoggingError::AlreadyConfigured { .. }));
        let err = init_logging("debug", other_dir.path()).unwrap_err();
        assert!(err.to_string().contains("refusing"));

        let (level, active_dir) = logging_status().unwrap();
        assert_eq!(level, LevelFilter::Debug);
        assert_eq!(active_dir, dir.path());
    }
}
