//! Spaced Review Scheduler
//!
//! Per-session state machine: `{ step: 0, 1, 2, ... } x { active, graduated }`.
//!
//! - initialize: step 0, first review two hours after the session
//! - complete: interval(step) is added to `now`, then step += 1
//! - graduate: absorbing; later transitions are no-ops
//!
//! Interval table (step before increment):
//!
//! | step | interval |
//! |------|----------|
//! | 0    | 1 day    |
//! | 1    | 4 days   |
//! | 2    | 7 days   |
//! | 3    | 14 days  |
//! | 4    | 28 days  |
//! | >=5  | 28 days * 2^(step - 4) |
//!
//! Every transition takes `now` explicitly and returns a new state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::types::{ReviewState, INITIAL_REVIEW_DELAY_MINUTES};

// ==================== Constants ====================

/// Fixed intervals in days for steps 0..=4
const BASE_INTERVAL_DAYS: [i64; 5] = [1, 4, 7, 14, 28];

/// Cap on the doubling (about 100k years); keeps the delta inside chrono's range
const MAX_INTERVAL_DAYS: i64 = 36_500_000;

/// Retention stability before the first review (days)
const UNREVIEWED_STABILITY_DAYS: f64 = 4.0;

/// Retention stability once reviewed at least once (days)
const REVIEWED_STABILITY_DAYS: f64 = 14.0;

// ==================== Intervals ====================

/// Interval in whole days granted when the review at `step` is completed
pub fn interval_days(step: u32) -> i64 {
    if let Some(&days) = BASE_INTERVAL_DAYS.get(step as usize) {
        return days;
    }
    let last = BASE_INTERVAL_DAYS[BASE_INTERVAL_DAYS.len() - 1];
    let doublings = step - (BASE_INTERVAL_DAYS.len() as u32 - 1);

    2i64.checked_pow(doublings)
        .and_then(|factor| last.checked_mul(factor))
        .map_or(MAX_INTERVAL_DAYS, |days| days.min(MAX_INTERVAL_DAYS))
}

pub fn interval_for_step(step: u32) -> Duration {
    Duration::days(interval_days(step))
}

fn add_saturating(at: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    at.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// ==================== Scheduler ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewScheduler {
    initial_delay_minutes: i64,
}

impl Default for ReviewScheduler {
    fn default() -> Self {
        Self {
            initial_delay_minutes: INITIAL_REVIEW_DELAY_MINUTES,
        }
    }
}

impl ReviewScheduler {
    pub fn new(initial_delay_minutes: i64) -> Self {
        Self {
            initial_delay_minutes: if initial_delay_minutes > 0 {
                initial_delay_minutes
            } else {
                INITIAL_REVIEW_DELAY_MINUTES
            },
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.initial_review_delay_minutes)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::try_minutes(self.initial_delay_minutes).unwrap_or(Duration::MAX)
    }

    /// State for a freshly recorded session; the first review is deferred
    pub fn initialize(&self, observed_at: DateTime<Utc>) -> ReviewState {
        ReviewState {
            step: 0,
            next_due_at: add_saturating(observed_at, self.initial_delay()),
            graduated: false,
        }
    }

    /// Record a completed review. No-op on a graduated state.
    pub fn complete(&self, state: ReviewState, now: DateTime<Utc>) -> ReviewState {
        if state.graduated {
            debug!(step = state.step, "Ignoring review completion on graduated session");
            return state;
        }

        ReviewState {
            step: state.step.saturating_add(1),
            next_due_at: add_saturating(now, interval_for_step(state.step)),
            graduated: false,
        }
    }

    /// Retire a session from scheduling. Idempotent.
    pub fn graduate(&self, state: ReviewState) -> ReviewState {
        if state.graduated {
            debug!(step = state.step, "Session already graduated");
            return state;
        }
        ReviewState {
            graduated: true,
            ..state
        }
    }
}

// ==================== Retention ====================

/// Estimated retention in percent: R = exp(-days / S)
///
/// S is 4 days before the first completed review and 14 days afterwards.
pub fn retention_percent(observed_at: DateTime<Utc>, step: u32, now: DateTime<Utc>) -> u8 {
    let elapsed_days = (now - observed_at).num_seconds() as f64 / 86_400.0;
    let stability = if step > 0 {
        REVIEWED_STABILITY_DAYS
    } else {
        UNREVIEWED_STABILITY_DAYS
    };
    let retention = (-elapsed_days / stability).exp();
    (retention * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    // ==================== interval 测试 ====================

    #[test]
    fn test_interval_table() {
        let expected = [1, 4, 7, 14, 28, 56, 112, 224, 448];
        for (step, days) in expected.iter().enumerate() {
            assert_eq!(interval_days(step as u32), *days, "step {}", step);
        }
    }

    #[test]
    fn test_interval_doubles_after_step_five() {
        for step in 5..20 {
            assert_eq!(interval_days(step + 1), interval_days(step) * 2);
        }
    }

    #[test]
    fn test_interval_saturates_for_huge_steps() {
        assert_eq!(interval_days(200), MAX_INTERVAL_DAYS);
        assert_eq!(interval_days(u32::MAX), MAX_INTERVAL_DAYS);
    }

    // ==================== transitions 测试 ====================

    #[test]
    fn test_initialize_defers_first_review() {
        let state = ReviewScheduler::default().initialize(t0());
        assert_eq!(state.step, 0);
        assert!(!state.graduated);
        assert_eq!(state.next_due_at, t0() + Duration::hours(2));
    }

    #[test]
    fn test_custom_initial_delay() {
        let scheduler = ReviewScheduler::new(30);
        assert_eq!(scheduler.initialize(t0()).next_due_at, t0() + Duration::minutes(30));
        // non-positive falls back
        assert_eq!(ReviewScheduler::new(0), ReviewScheduler::default());
    }

    #[test]
    fn test_complete_uses_pre_increment_step() {
        let scheduler = ReviewScheduler::default();
        let state = scheduler.initialize(t0());
        let now = t0() + Duration::days(1);
        let next = scheduler.complete(state, now);
        assert_eq!(next.step, 1);
        assert_eq!(next.next_due_at, now + Duration::days(1));

        let later = scheduler.complete(next, now);
        assert_eq!(later.step, 2);
        assert_eq!(later.next_due_at, now + Duration::days(4));
    }

    #[test]
    fn test_successive_completions_follow_table() {
        let scheduler = ReviewScheduler::default();
        let mut state = scheduler.initialize(t0());
        let mut now = t0();
        for (i, days) in [1, 4, 7, 14, 28, 56, 112].iter().enumerate() {
            now = now + Duration::hours(3);
            state = scheduler.complete(state, now);
            assert_eq!(state.step, i as u32 + 1);
            assert_eq!(state.next_due_at - now, Duration::days(*days));
        }
    }

    #[test]
    fn test_graduation_is_absorbing() {
        let scheduler = ReviewScheduler::default();
        let state = scheduler.complete(scheduler.initialize(t0()), t0());
        let graduated = scheduler.graduate(state);
        assert!(graduated.graduated);
        assert_eq!(graduated.step, state.step);

        let after = scheduler.complete(graduated, t0() + Duration::days(30));
        assert_eq!(after, graduated);
        assert_eq!(scheduler.graduate(graduated), graduated);
    }

    #[test]
    fn test_complete_saturates_far_future() {
        let scheduler = ReviewScheduler::default();
        let state = ReviewState {
            step: 1000,
            next_due_at: t0(),
            graduated: false,
        };
        let next = scheduler.complete(state, t0());
        assert_eq!(next.step, 1001);
        assert!(next.next_due_at > t0());
    }

    // ==================== retention 测试 ====================

    #[test]
    fn test_retention_decays() {
        assert_eq!(retention_percent(t0(), 0, t0()), 100);
        let four_days = t0() + Duration::days(4);
        // e^-1
        assert_eq!(retention_percent(t0(), 0, four_days), 37);
        assert!(retention_percent(t0(), 1, four_days) > 37);
        assert_eq!(retention_percent(t0(), 0, t0() + Duration::days(365)), 0);
    }

    #[test]
    fn test_retention_caps_future_observations() {
        assert_eq!(retention_percent(t0() + Duration::days(1), 0, t0()), 100);
    }
}
