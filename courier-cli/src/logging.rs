// courier-cli/src/logging.rs

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR_NAME: &str = "courier";
const DEFAULT_LEVEL: Level = Level::WARN;

/// Keeps the non-blocking file writer flushing until dropped.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    pub log_path: PathBuf,
}

/// Creates `<base>/courier` if needed and returns it.
pub fn prepare_log_dir(base: &Path) -> Result<PathBuf> {
    let dir = base.join(LOG_DIR_NAME);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    Ok(dir)
}

fn default_log_base() -> PathBuf {
    dirs::cache_dir()
        .or_else(dirs::runtime_dir)
        .unwrap_or_else(env::temp_dir)
}

/// Installs a stderr layer and a file layer for `app_name`. Level comes from
/// `RUST_LOG`, defaulting to WARN.
pub fn init_logging(app_name: &str) -> Result<LoggingGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(DEFAULT_LEVEL.into()));

    let log_dir = prepare_log_dir(&default_log_base())?;
    let log_file_name = format!("{}.log", app_name);
    let log_path = log_dir.join(&log_file_name);

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file_name);
    let (non_blocking_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let time_format_desc = time::format_description::parse(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]",
    )
    .context("Failed to parse log time format")?;
    let local_timer = LocalTime::new(time_format_desc);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_timer(local_timer.clone());

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(local_timer)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    info!(
        "Logging initialized. Level from RUST_LOG (default: {}). Logging to stderr and {}",
        DEFAULT_LEVEL,
        log_path.display()
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_path,
    })
}
