#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use studywise_algo::TestObservation;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn observation(id: &str, days_after: i64, score: f64, volume: f64) -> TestObservation {
    TestObservation {
        id: id.to_string(),
        observed_at: t0() + Duration::days(days_after),
        score,
        volume_invested: volume,
        study_hours: 5.0,
        test_minutes_actual: 90.0,
        test_minutes_recommended: 60.0,
    }
}
