//! Subscriber setup for hosts embedding the engine.
//!
//! The library only emits `tracing` events; nothing here runs unless the
//! host calls [`init_tracing`].

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::EngineConfig;

const LOG_FILE_PREFIX: &str = "studywise.log";

/// Keeps the non-blocking file writer alive; dropping it flushes pending lines
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn is_enabled_flag(value: &str) -> bool {
    value == "true" || value == "1"
}

/// `STUDYWISE_FILE_LOGS` set to `true` or `1`
pub fn file_logging_enabled() -> bool {
    std::env::var("STUDYWISE_FILE_LOGS")
        .map(|v| is_enabled_flag(&v))
        .unwrap_or(false)
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber described by `config`.
///
/// Stdout always gets a fmt layer. With `config.file_logs` a daily rolling
/// file under `config.log_dir` is added and its guard returned. Returns
/// `None` when a subscriber was already installed.
pub fn init_tracing(config: &EngineConfig) -> Option<FileLogGuard> {
    let env_filter = build_filter(&config.log_level);
    let stdout_layer = fmt::layer().with_target(true);

    if config.file_logs {
        let log_dir = &config.log_dir;
        if let Err(err) = std::fs::create_dir_all(log_dir) {
            eprintln!("failed to create log directory {log_dir}: {err}");
        } else {
            let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);

            return match tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .try_init()
            {
                Ok(()) => Some(FileLogGuard { _guard: guard }),
                Err(err) => {
                    eprintln!("file logging not installed: {err}");
                    None
                }
            };
        }
    }

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init()
    {
        eprintln!("tracing subscriber not installed: {err}");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_falls_back() {
        // must not panic on garbage directives
        let _ = build_filter("not a [valid filter");
    }

    #[test]
    fn test_enabled_flag_values() {
        assert!(is_enabled_flag("true"));
        assert!(is_enabled_flag("1"));
        assert!(!is_enabled_flag("TRUE"));
        assert!(!is_enabled_flag("0"));
        assert!(!is_enabled_flag(""));
    }

    #[test]
    fn test_file_layer_skipped_when_subscriber_exists() {
        let config = EngineConfig::default();
        assert!(init_tracing(&config).is_none());
        // repeated init is tolerated
        assert!(init_tracing(&config).is_none());

        let log_dir = std::env::temp_dir().join("studywise-logging-test");
        let with_file = EngineConfig {
            file_logs: true,
            log_dir: log_dir.to_string_lossy().into_owned(),
            ..EngineConfig::default()
        };
        assert!(init_tracing(&with_file).is_none());
    }
}
