//! Logging setup for the CLI.
//!
//! Human-readable events go to stderr. A JSON Lines file layer is added when
//! a log file is configured through `ISO4_LOG_PATH`, `ISO4_LOG_DIR` or the
//! `log_dir` config key.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Explicit log file path.
pub const LOG_PATH_ENV: &str = "ISO4_LOG_PATH";
/// Directory for `iso4.jsonl`.
pub const LOG_DIR_ENV: &str = "ISO4_LOG_DIR";

const LOG_FILE_NAME: &str = "iso4.jsonl";

/// Where structured logs are written, if anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// JSON Lines log file. `None` disables the file layer.
    pub log_file: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Resolve the log file from the environment, then the configured directory.
    ///
    /// `ISO4_LOG_PATH` wins over `ISO4_LOG_DIR`, which wins over `log_dir`.
    pub fn from_env_with_overrides(log_dir: Option<PathBuf>) -> Self {
        Self::resolve(
            std::env::var_os(LOG_PATH_ENV).map(PathBuf::from),
            std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
            log_dir,
        )
    }

    fn resolve(
        log_path: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        let log_file = log_path
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| {
                env_dir
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .or(config_dir)
                    .map(|dir| dir.join(LOG_FILE_NAME))
            });
        Self { log_file }
    }
}

/// Build the event filter.
///
/// `RUST_LOG` takes precedence. Otherwise `-q` selects `error`, `-v` selects
/// `debug`, `-vv` selects `trace`, and the configured level applies.
pub fn env_filter(quiet: bool, verbose: u8, config_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(level_for(quiet, verbose, config_level))
}

fn level_for(quiet: bool, verbose: u8, config_level: &str) -> &str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => config_level,
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Level shown on stderr. Routine info events stay out of the terminal
/// unless `-v` is given.
pub const fn stderr_level(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held until
/// exit.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
    stderr_level: LevelFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_level);

    let (file_layer, guard) = match config.log_file.as_deref() {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_current_span(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(guard)
}

fn file_writer(
    path: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let file_name = path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", path.display()))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sources_disables_file_logging() {
        let config = ObservabilityConfig::resolve(None, None, None);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn explicit_path_wins() {
        let config = ObservabilityConfig::resolve(
            Some(PathBuf::from("/tmp/a.log")),
            Some(PathBuf::from("/tmp/env")),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/a.log")));
    }

    #[test]
    fn env_dir_beats_config_dir() {
        let config = ObservabilityConfig::resolve(
            None,
            Some(PathBuf::from("/tmp/env")),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/env/iso4.jsonl")));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = ObservabilityConfig::resolve(
            Some(PathBuf::new()),
            Some(PathBuf::new()),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(
            config.log_file,
            Some(PathBuf::from("/tmp/config/iso4.jsonl"))
        );
    }

    #[test]
    fn level_follows_flags() {
        assert_eq!(level_for(true, 2, "info"), "error");
        assert_eq!(level_for(false, 0, "warn"), "warn");
        assert_eq!(level_for(false, 1, "warn"), "debug");
        assert_eq!(level_for(false, 3, "warn"), "trace");
    }

    #[test]
    fn stderr_is_quiet_by_default() {
        assert_eq!(stderr_level(false, 0), LevelFilter::WARN);
        assert_eq!(stderr_level(true, 0), LevelFilter::ERROR);
        assert_eq!(stderr_level(false, 1), LevelFilter::DEBUG);
    }
}
