//! Logging setup: human-readable stderr plus an optional JSONL file.
//!
//! Stdout is reserved for command output (and the MCP transport), so every
//! log line goes to stderr or the file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const LOG_PATH_ENV: &str = "KEYWORD_DENSITY_LOG_PATH";
const LOG_DIR_ENV: &str = "KEYWORD_DENSITY_LOG_DIR";
const LOG_FILE_NAME: &str = "keyword-density.jsonl";

/// Where JSONL logs are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Exact file to append to. Wins over `log_dir`.
    pub log_path: Option<PathBuf>,
    /// Directory that receives `keyword-density.jsonl`.
    pub log_dir: Option<PathBuf>,
    /// Whether `log_dir` was chosen by the user rather than defaulted.
    pub explicit_dir: bool,
}

impl ObservabilityConfig {
    /// Resolve log locations.
    ///
    /// Precedence: `KEYWORD_DENSITY_LOG_PATH`, then `KEYWORD_DENSITY_LOG_DIR`,
    /// then the config file's `log_dir`, then the platform data directory.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        Self::resolve(
            std::env::var_os(LOG_PATH_ENV).map(PathBuf::from),
            std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
            config_log_dir,
        )
    }

    fn resolve(
        env_path: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        let explicit = env_dir.or(config_dir);
        let explicit_dir = explicit.is_some();
        let log_dir = explicit.or_else(|| {
            keyword_density_core::config::user_data_local_dir()
                .map(|dir| dir.join("logs").into_std_path_buf())
        });
        Self {
            log_path: env_path,
            log_dir,
            explicit_dir,
        }
    }

    /// Directory and file name for the JSONL log, if any.
    fn target(&self) -> Option<(PathBuf, String)> {
        if let Some(ref path) = self.log_path {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            let name = path.file_name()?.to_string_lossy().into_owned();
            return Some((dir, name));
        }
        self.log_dir
            .as_ref()
            .map(|dir| (dir.clone(), LOG_FILE_NAME.to_string()))
    }

    fn is_explicit(&self) -> bool {
        self.log_path.is_some() || self.explicit_dir
    }
}

/// Filter for the JSONL file.
///
/// `-q` and `-v` win over `RUST_LOG`, which wins over the config file level.
pub fn env_filter(quiet: bool, verbose: u8, config_level: &str) -> EnvFilter {
    if let Some(level) = flag_level(quiet, verbose) {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
}

/// Filter for stderr: warnings and errors unless asked for more.
pub fn stderr_filter(quiet: bool, verbose: u8) -> EnvFilter {
    if let Some(level) = flag_level(quiet, verbose) {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

const fn flag_level(quiet: bool, verbose: u8) -> Option<&'static str> {
    match (quiet, verbose) {
        (true, _) => Some("error"),
        (false, 0) => None,
        (false, 1) => Some("info"),
        (false, 2) => Some("debug"),
        (false, _) => Some("trace"),
    }
}

/// Keeps the background log writer alive; drop it to flush.
#[derive(Debug)]
pub struct ObservabilityGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// A default log directory that cannot be created is skipped silently; one
/// the user asked for is an error.
pub fn init_observability(
    config: &ObservabilityConfig,
    file_filter: EnvFilter,
    stderr_filter: EnvFilter,
) -> anyhow::Result<ObservabilityGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let mut file_guard = None;
    let file_layer = match config.target() {
        Some((dir, name)) => match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::never(&dir, name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                file_guard = Some(guard);
                Some(
                    fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_filter(file_filter),
                )
            }
            Err(e) if config.is_explicit() => {
                return Err(e)
                    .with_context(|| format!("failed to create log directory {}", dir.display()));
            }
            Err(_) => None,
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(ObservabilityGuard { _file: file_guard })
}
