//! Common Types and Constants
//!
//! Shared data structures used across all analytics modules. Everything here
//! is a plain value object that serializes to camelCase JSON so the host layer
//! can persist it verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==================== Constants ====================

/// Delay before the first review of a freshly recorded session (minutes)
pub const INITIAL_REVIEW_DELAY_MINUTES: i64 = 120;

/// Minimum trapezoid subintervals for the headline effort index
pub const EFFORT_SUBINTERVALS: usize = 2000;

/// Minimum trapezoid subintervals for the mental burden weight
pub const BURDEN_SUBINTERVALS: usize = 50;

/// Exponent of the fitted effort curve y = C * x^0.4
pub const EFFORT_CURVE_EXPONENT: f64 = 0.4;

/// Lower bound of the normalized progress axis
pub const EFFORT_X_START: f64 = 2.0;

/// Exponent applied to tTest / tRec when computing the upper bound
pub const EFFORT_X_END_EXPONENT: f64 = 2.5;

// ==================== Session Types ====================

/// Scheduling metadata attached 1:1 to a [`SessionRecord`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Number of completed reviews
    pub step: u32,
    /// When the next review is due
    pub next_due_at: DateTime<Utc>,
    /// Retired from scheduling; absorbing
    pub graduated: bool,
}

impl ReviewState {
    pub fn is_active(&self) -> bool {
        !self.graduated
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.next_due_at <= now
    }
}

/// One unit of observed study work
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    /// Opaque key of the subject owned by the host layer
    pub subject_id: String,
    /// Volume completed (e.g. pages)
    pub quantity: f64,
    /// Time spent, fractional minutes allowed
    pub duration_minutes: f64,
    pub observed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub review: ReviewState,
}

impl SessionRecord {
    /// Create a record with a fresh UUID and the given review state
    pub fn new(
        subject_id: impl Into<String>,
        quantity: f64,
        duration_minutes: f64,
        observed_at: DateTime<Utc>,
        review: ReviewState,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.into(),
            quantity,
            duration_minutes,
            observed_at,
            review,
        }
    }

    /// Eligible for pace statistics (both quantity and duration positive)
    pub fn is_pace_eligible(&self) -> bool {
        crate::sanitize::is_positive(self.quantity)
            && crate::sanitize::is_positive(self.duration_minutes)
    }

    pub fn sample(&self) -> PaceSample {
        PaceSample {
            quantity: self.quantity,
            duration_minutes: self.duration_minutes,
        }
    }
}

// ==================== Statistics Types ====================

/// A (quantity, duration) observation fed to the aggregator
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceSample {
    pub quantity: f64,
    pub duration_minutes: f64,
}

impl PaceSample {
    pub fn new(quantity: f64, duration_minutes: f64) -> Self {
        Self {
            quantity,
            duration_minutes,
        }
    }
}

/// Pace statistics for one subject
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Mean minutes per unit
    pub mean_pace_per_unit: f64,
    /// Population standard deviation of minutes per unit
    pub std_dev_per_unit: f64,
    /// Sum of all observed minutes, eligible or not
    pub total_duration: f64,
    /// Mean pace times the remaining quantity
    pub estimated_remaining_duration: f64,
}

// ==================== Prediction Types ====================

/// One scored assessment within an analysis space
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestObservation {
    pub id: String,
    #[serde(alias = "timestamp")]
    pub observed_at: DateTime<Utc>,
    #[serde(alias = "h1")]
    pub score: f64,
    /// Study volume invested since the previous observation
    #[serde(alias = "b")]
    pub volume_invested: f64,
    #[serde(alias = "tStudy")]
    pub study_hours: f64,
    #[serde(alias = "tTest")]
    pub test_minutes_actual: f64,
    #[serde(alias = "tRec")]
    pub test_minutes_recommended: f64,
}

/// Parameters shared by all predictor sub-algorithms
///
/// - `h1`: score before the improvement being modeled
/// - `h2`: observed score delta
/// - `h3`: target additional delta to plan for
/// - `b`: volume invested to obtain `h2`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInputs {
    pub h1: f64,
    pub h2: f64,
    pub h3: f64,
    pub b: f64,
    pub t_study: f64,
    pub t_test: f64,
    pub t_rec: f64,
}

impl PredictionInputs {
    /// Build inputs from two temporally adjacent observations
    pub fn from_pair(previous: &TestObservation, latest: &TestObservation, h3: f64) -> Self {
        Self {
            h1: previous.score,
            h2: latest.score - previous.score,
            h3,
            b: latest.volume_invested,
            t_study: latest.study_hours,
            t_test: latest.test_minutes_actual,
            t_rec: latest.test_minutes_recommended,
        }
    }
}

/// Composite review-priority weight
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalBurden {
    pub total: f64,
    /// Entry cost C * 2^0.4
    pub initial: f64,
    /// Coarse arc length over the effort bounds
    pub arc_length: f64,
}

/// Derived prediction; never cached since it depends on `h3`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// False when the shared preconditions fail; all other fields are zero then
    pub computable: bool,
    pub linear_volume: f64,
    pub cubic_volume: f64,
    pub effort_index: f64,
    pub density_coefficient: f64,
    pub mental_burden: MentalBurden,
}

impl PredictionResult {
    pub fn not_computable() -> Self {
        Self::default()
    }
}
