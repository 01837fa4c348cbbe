use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::logging::file_logging_enabled;
use crate::types::{BURDEN_SUBINTERVALS, EFFORT_SUBINTERVALS, INITIAL_REVIEW_DELAY_MINUTES};

const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Delay before the first review of a new session
    pub initial_review_delay_minutes: i64,
    /// Trapezoid subintervals for the effort index (floor 2000)
    pub effort_subintervals: usize,
    /// Trapezoid subintervals for the mental burden (floor 50)
    pub burden_subintervals: usize,
    pub log_level: String,
    /// Add a daily-rolling file layer next to stdout
    pub file_logs: bool,
    pub log_dir: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_review_delay_minutes: INITIAL_REVIEW_DELAY_MINUTES,
            effort_subintervals: EFFORT_SUBINTERVALS,
            burden_subintervals: BURDEN_SUBINTERVALS,
            log_level: "info".to_string(),
            file_logs: false,
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let initial_review_delay_minutes = std::env::var("STUDYWISE_INITIAL_REVIEW_DELAY_MINUTES")
            .ok()
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(defaults.initial_review_delay_minutes);

        let effort_subintervals = std::env::var("STUDYWISE_EFFORT_SUBINTERVALS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(defaults.effort_subintervals);

        let burden_subintervals = std::env::var("STUDYWISE_BURDEN_SUBINTERVALS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(defaults.burden_subintervals);

        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        let log_dir = std::env::var("STUDYWISE_LOG_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or(defaults.log_dir);

        Self {
            initial_review_delay_minutes,
            effort_subintervals,
            burden_subintervals,
            log_level,
            file_logs: file_logging_enabled(),
            log_dir,
        }
        .normalized()
    }

    /// Raise subinterval counts to their precision floors and reset a
    /// non-positive review delay to the default.
    pub fn normalized(mut self) -> Self {
        if self.effort_subintervals < EFFORT_SUBINTERVALS {
            warn!(
                configured = self.effort_subintervals,
                floor = EFFORT_SUBINTERVALS,
                "Effort subintervals below precision floor"
            );
            self.effort_subintervals = EFFORT_SUBINTERVALS;
        }
        if self.burden_subintervals < BURDEN_SUBINTERVALS {
            warn!(
                configured = self.burden_subintervals,
                floor = BURDEN_SUBINTERVALS,
                "Burden subintervals below precision floor"
            );
            self.burden_subintervals = BURDEN_SUBINTERVALS;
        }
        if self.initial_review_delay_minutes <= 0 {
            warn!(
                configured = self.initial_review_delay_minutes,
                "Non-positive initial review delay, using default"
            );
            self.initial_review_delay_minutes = INITIAL_REVIEW_DELAY_MINUTES;
        }
        self
    }
}
