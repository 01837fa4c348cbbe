//! Pace Statistics
//!
//! Turns (quantity, duration) session samples into a mean pace, its spread,
//! and a remaining-time estimate, plus the planner figures derived from them.
//!
//! - pace_i = durationMinutes_i / quantity_i (minutes per unit)
//! - mean: arithmetic mean of pace_i over eligible samples
//! - std dev: population form (divide by N)
//! - total duration: sum over every sample, eligible or not

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::sanitize::{finite_or_zero, is_non_negative, is_positive};
use crate::types::{PaceSample, SessionRecord, Stats};

const MINUTES_PER_HOUR: f64 = 60.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

// ==================== Aggregation ====================

/// Aggregate pace statistics over `samples`.
///
/// Returns all zeros when no sample has both a positive quantity and a
/// positive duration.
pub fn aggregate(samples: &[PaceSample], remaining_quantity: f64) -> Stats {
    let paces: Vec<f64> = samples
        .iter()
        .filter(|s| is_positive(s.quantity) && is_positive(s.duration_minutes))
        .map(|s| s.duration_minutes / s.quantity)
        .collect();

    if paces.is_empty() {
        return Stats::default();
    }

    let n = paces.len() as f64;
    let mean = paces.iter().sum::<f64>() / n;
    let variance = paces.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;

    let total_duration = samples
        .iter()
        .map(|s| finite_or_zero(s.duration_minutes))
        .sum::<f64>();

    let remaining = if remaining_quantity.is_finite() {
        remaining_quantity.max(0.0)
    } else {
        0.0
    };

    Stats {
        mean_pace_per_unit: mean,
        std_dev_per_unit: variance.sqrt(),
        total_duration,
        estimated_remaining_duration: mean * remaining,
    }
}

/// Aggregate over the records of one subject
pub fn aggregate_records<'a, I>(records: I, remaining_quantity: f64) -> Stats
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let samples: Vec<PaceSample> = records.into_iter().map(SessionRecord::sample).collect();
    aggregate(&samples, remaining_quantity)
}

// ==================== Planner ====================

/// Study target for one subject
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPlan {
    pub total_quantity: f64,
    pub completed_quantity: f64,
    pub target_date: DateTime<Utc>,
}

impl SubjectPlan {
    pub fn remaining_quantity(&self) -> f64 {
        finite_or_zero(self.total_quantity - self.completed_quantity).max(0.0)
    }
}

/// Whole days from `now` until `target`, rounded up
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (target - now).num_milliseconds() as f64 / 1000.0;
    (seconds / SECONDS_PER_DAY).ceil() as i64
}

/// Quantity per day needed to finish on time; everything if the date has passed
pub fn daily_quantity_needed(plan: &SubjectPlan, now: DateTime<Utc>) -> f64 {
    let remaining = plan.remaining_quantity();
    let days = days_until(plan.target_date, now);
    if days <= 0 {
        remaining
    } else {
        (remaining / days as f64).ceil()
    }
}

/// Minutes per day implied by the remaining-time estimate
pub fn daily_minutes_needed(stats: &Stats, days_remaining: i64) -> f64 {
    if days_remaining > 0 {
        stats.estimated_remaining_duration / days_remaining as f64
    } else {
        stats.estimated_remaining_duration
    }
}

/// Dashboard card for one subject
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectOverview {
    pub stats: Stats,
    pub days_remaining: i64,
    pub daily_quantity_needed: f64,
    pub daily_minutes_needed: f64,
}

pub fn subject_overview<'a, I>(records: I, plan: &SubjectPlan, now: DateTime<Utc>) -> SubjectOverview
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let stats = aggregate_records(records, plan.remaining_quantity());
    let days_remaining = days_until(plan.target_date, now);

    SubjectOverview {
        stats,
        days_remaining,
        daily_quantity_needed: daily_quantity_needed(plan, now),
        daily_minutes_needed: daily_minutes_needed(&stats, days_remaining),
    }
}

// ==================== Summaries ====================

/// Totals for one calendar day (UTC)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub session_count: usize,
    pub total_minutes: f64,
    pub total_quantity: f64,
    pub minutes_per_unit: f64,
}

pub fn day_summary(records: &[SessionRecord], day: NaiveDate) -> DaySummary {
    let mut summary = DaySummary::default();
    for record in records.iter().filter(|r| r.observed_at.date_naive() == day) {
        summary.session_count += 1;
        summary.total_minutes += finite_or_zero(record.duration_minutes);
        summary.total_quantity += finite_or_zero(record.quantity);
    }
    if summary.total_quantity > 0.0 {
        summary.minutes_per_unit = summary.total_minutes / summary.total_quantity;
    }
    summary
}

/// One point of the pace history chart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacePoint {
    pub session_id: String,
    pub subject_id: String,
    pub observed_at: DateTime<Utc>,
    pub minutes_per_unit: Option<f64>,
}

/// Pace of the last `limit` records in their given order
pub fn recent_paces(records: &[SessionRecord], limit: usize) -> Vec<PacePoint> {
    let start = records.len().saturating_sub(limit);
    records[start..]
        .iter()
        .map(|r| PacePoint {
            session_id: r.id.clone(),
            subject_id: r.subject_id.clone(),
            observed_at: r.observed_at,
            minutes_per_unit: if is_positive(r.quantity) && is_non_negative(r.duration_minutes) {
                Some(r.duration_minutes / r.quantity)
            } else {
                None
            },
        })
        .collect()
}

/// Study volume accumulated since the last test observation
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSince {
    pub volume: f64,
    /// Hours, rounded to one decimal
    pub study_hours: f64,
}

/// Sum a subject's records strictly after `since` (all of them when `None`)
pub fn volume_since(
    records: &[SessionRecord],
    subject_id: &str,
    since: Option<DateTime<Utc>>,
) -> VolumeSince {
    let (volume, minutes) = records
        .iter()
        .filter(|r| r.subject_id == subject_id)
        .filter(|r| since.map_or(true, |t| r.observed_at > t))
        .fold((0.0, 0.0), |(v, m), r| {
            (v + finite_or_zero(r.quantity), m + finite_or_zero(r.duration_minutes))
        });

    VolumeSince {
        volume,
        study_hours: (minutes / MINUTES_PER_HOUR * 10.0).round() / 10.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewState;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn record(subject: &str, quantity: f64, minutes: f64, at: DateTime<Utc>) -> SessionRecord {
        let review = ReviewState {
            step: 0,
            next_due_at: at,
            graduated: false,
        };
        SessionRecord::new(subject, quantity, minutes, at, review)
    }

    // ==================== aggregate 测试 ====================

    #[test]
    fn test_aggregate_empty_is_all_zero() {
        for remaining in [0.0, 10.0, -5.0, 1e6] {
            assert_eq!(aggregate(&[], remaining), Stats::default());
        }
    }

    #[test]
    fn test_aggregate_mean_and_estimate() {
        let samples = [PaceSample::new(10.0, 100.0), PaceSample::new(20.0, 150.0)];
        let stats = aggregate(&samples, 4.0);
        assert!((stats.mean_pace_per_unit - 8.75).abs() < 1e-12);
        assert!((stats.estimated_remaining_duration - 35.0).abs() < 1e-12);
        assert!((stats.total_duration - 250.0).abs() < 1e-12);
        // population std dev of (10, 7.5)
        assert!((stats.std_dev_per_unit - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_single_sample_has_zero_spread() {
        let stats = aggregate(&[PaceSample::new(4.0, 10.0)], 2.0);
        assert!((stats.mean_pace_per_unit - 2.5).abs() < 1e-12);
        assert_eq!(stats.std_dev_per_unit, 0.0);
        assert!((stats.estimated_remaining_duration - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_total_counts_ineligible_samples() {
        let samples = [
            PaceSample::new(10.0, 30.0),
            PaceSample::new(0.0, 20.0),
            PaceSample::new(5.0, 0.0),
        ];
        let stats = aggregate(&samples, 0.0);
        assert!((stats.mean_pace_per_unit - 3.0).abs() < 1e-12);
        assert!((stats.total_duration - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_only_ineligible_samples_is_zero() {
        let samples = [PaceSample::new(0.0, 20.0), PaceSample::new(3.0, -1.0)];
        assert_eq!(aggregate(&samples, 10.0), Stats::default());
    }

    #[test]
    fn test_aggregate_negative_remaining_floors_at_zero() {
        let stats = aggregate(&[PaceSample::new(2.0, 10.0)], -8.0);
        assert_eq!(stats.estimated_remaining_duration, 0.0);
    }

    // ==================== planner 测试 ====================

    #[test]
    fn test_days_until_rounds_up() {
        assert_eq!(days_until(t0() + Duration::hours(1), t0()), 1);
        assert_eq!(days_until(t0() + Duration::days(3), t0()), 3);
        assert_eq!(days_until(t0() - Duration::hours(30), t0()), -1);
    }

    #[test]
    fn test_daily_quantity_needed() {
        let plan = SubjectPlan {
            total_quantity: 100.0,
            completed_quantity: 30.0,
            target_date: t0() + Duration::days(3),
        };
        assert_eq!(daily_quantity_needed(&plan, t0()), 24.0);

        let overdue = SubjectPlan {
            target_date: t0() - Duration::days(1),
            ..plan
        };
        assert_eq!(daily_quantity_needed(&overdue, t0()), 70.0);
    }

    #[test]
    fn test_subject_overview() {
        let records = vec![record("math", 10.0, 100.0, t0()), record("math", 20.0, 150.0, t0())];
        let plan = SubjectPlan {
            total_quantity: 34.0,
            completed_quantity: 30.0,
            target_date: t0() + Duration::days(5),
        };
        let overview = subject_overview(&records, &plan, t0());
        assert!((overview.stats.estimated_remaining_duration - 35.0).abs() < 1e-12);
        assert_eq!(overview.days_remaining, 5);
        assert!((overview.daily_minutes_needed - 7.0).abs() < 1e-12);
        assert_eq!(overview.daily_quantity_needed, 1.0);
    }

    #[test]
    fn test_daily_minutes_needed_without_days_left() {
        let stats = Stats {
            estimated_remaining_duration: 90.0,
            ..Stats::default()
        };
        assert_eq!(daily_minutes_needed(&stats, 0), 90.0);
        assert_eq!(daily_minutes_needed(&stats, 3), 30.0);
    }

    // ==================== summaries 测试 ====================

    #[test]
    fn test_day_summary_filters_by_day() {
        let records = vec![
            record("math", 10.0, 30.0, t0()),
            record("bio", 5.0, 30.0, t0() + Duration::hours(2)),
            record("math", 99.0, 99.0, t0() + Duration::days(1)),
        ];
        let summary = day_summary(&records, t0().date_naive());
        assert_eq!(summary.session_count, 2);
        assert_eq!(summary.total_minutes, 60.0);
        assert_eq!(summary.total_quantity, 15.0);
        assert!((summary.minutes_per_unit - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_recent_paces_keeps_tail() {
        let records = vec![
            record("math", 10.0, 30.0, t0()),
            record("math", 0.0, 30.0, t0()),
            record("math", 4.0, 10.0, t0()),
        ];
        let points = recent_paces(&records, 2);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].minutes_per_unit, None);
        assert_eq!(points[1].minutes_per_unit, Some(2.5));
    }

    #[test]
    fn test_volume_since_last_observation() {
        let records = vec![
            record("math", 10.0, 30.0, t0()),
            record("math", 12.0, 50.0, t0() + Duration::hours(3)),
            record("bio", 40.0, 60.0, t0() + Duration::hours(4)),
            record("math", 8.0, 45.0, t0() + Duration::hours(5)),
        ];
        let since = volume_since(&records, "math", Some(t0()));
        assert_eq!(since.volume, 20.0);
        // 95 minutes -> 1.583h -> 1.6
        assert!((since.study_hours - 1.6).abs() < 1e-12);

        let all = volume_since(&records, "math", None);
        assert_eq!(all.volume, 30.0);
    }
}
