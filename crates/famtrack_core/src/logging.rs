//! Rolling file logging for famtrack hosts.
//!
//! # Invariants
//! - At most one logger per process; repeating [`init_logging`] with the same
//!   settings is a no-op, any other settings are rejected.
//! - Every line is a single `key=value` event carrying metadata only. Member
//!   names, notes and meal descriptions never reach the log, and panic
//!   messages are dropped because they may quote record contents.

use flexi_logger::{
    Cleanup, Criterion, DeferredNow, FileSpec, FlexiLoggerError, LogSpecification, Logger,
    LoggerHandle, Naming, WriteMode, TS_DASHES_BLANK_COLONS_DOT_BLANK,
};
use log::{error, info, LevelFilter, Record};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "famtrack";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 3;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

/// Where and how verbosely famtrack logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub dir: PathBuf,
}

impl LogSettings {
    /// Parses a level name (`off`, `error`, `warn`/`warning`, `info`, `debug`,
    /// `trace`, any case) and an absolute log directory.
    pub fn parse(level: &str, dir: &str) -> Result<Self, LogInitError> {
        let level_name = level.trim().to_ascii_lowercase();
        let level = match level_name.as_str() {
            "warning" => LevelFilter::Warn,
            other => other
                .parse::<LevelFilter>()
                .map_err(|_| LogInitError::UnknownLevel(level_name.clone()))?,
        };

        let dir = dir.trim();
        if dir.is_empty() || !Path::new(dir).is_absolute() {
            return Err(LogInitError::RelativeDir(dir.to_string()));
        }

        Ok(Self {
            level,
            dir: PathBuf::from(dir),
        })
    }
}

#[derive(Debug)]
pub enum LogInitError {
    UnknownLevel(String),
    /// Log directory was empty or not absolute.
    RelativeDir(String),
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    Start(FlexiLoggerError),
    /// A logger with other settings is already running.
    Conflict {
        active: LogSettings,
        requested: LogSettings,
    },
}

impl Display for LogInitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected off|error|warn|info|debug|trace"
            ),
            Self::RelativeDir(dir) => write!(f, "log directory must be absolute, got `{dir}`"),
            Self::CreateDir { dir, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                dir.display()
            ),
            Self::Start(err) => write!(f, "failed to start logger: {err}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already active at `{}` ({}); refusing `{}` ({})",
                active.dir.display(),
                active.level,
                requested.dir.display(),
                requested.level
            ),
        }
    }
}

impl Error for LogInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Start(err) => Some(err),
            _ => None,
        }
    }
}

struct ActiveLogger {
    settings: LogSettings,
    handle: LoggerHandle,
}

/// Starts rolling file logging. See [`LogSettings::parse`] for accepted input.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LogInitError> {
    let requested = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(requested.clone()))?;
    if active.settings != requested {
        return Err(LogInitError::Conflict {
            active: active.settings.clone(),
            requested,
        });
    }
    Ok(())
}

/// Writes buffered log lines to disk. Hosts call this before exiting.
pub fn flush_logs() {
    if let Some(active) = ACTIVE.get() {
        active.handle.flush();
    }
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(settings: LogSettings) -> Result<ActiveLogger, LogInitError> {
    std::fs::create_dir_all(&settings.dir).map_err(|source| LogInitError::CreateDir {
        dir: settings.dir.clone(),
        source,
    })?;

    let spec = LogSpecification::builder().default(settings.level).build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(event_line)
        .start()
        .map_err(LogInitError::Start)?;

    install_panic_hook();
    info!(
        "event=logging_init module=core status=ok os={} version={} level={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        settings.level
    );

    Ok(ActiveLogger { settings, handle })
}

fn event_line(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record<'_>,
) -> std::io::Result<()> {
    let message = record.args().to_string().replace(['\n', '\r'], " ");
    write!(
        w,
        "{} {:<5} [{}] {}",
        now.format(TS_DASHES_BLANK_COLONS_DOT_BLANK),
        record.level(),
        record.target(),
        message
    )
}

// Called once, from inside the `ACTIVE` initializer.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let thread = std::thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string();
        error!("event=panic module=core status=error thread={thread} location={location}");
        flush_logs();
        previous(panic_info);
    }));
}
