//! Performance Predictor
//!
//! Given two temporally adjacent test observations, estimates how much more
//! study volume a further score gain will cost, and how effortful the last
//! gain was.
//!
//! Models:
//! - Linear: volume scales with the score delta
//!   - V_lin = (b / h2) * h3
//! - Cubic: score grows with the cube root of cumulative effort
//!   - r1 = ((h1 + h2) / h1)^3
//!   - bucket = b + b / (r1 - 1)
//!   - r2 = ((h1 + h2 + h3) / (h1 + h2))^3
//!   - V_cub = max(0, bucket * (r2 - 1))
//! - Effort index: arc length of y = C * x^0.4 over [2, (tTest / tRec)^2.5 + 1]
//!   - C = ((h1 + h2)^3 / ((h1 + h2)^3 - h1^3)) * (tStudy / b)
//!   - integrand: sqrt(1 + (0.4 * C * x^-0.6)^2)
//! - Mental burden: C * 2^0.4 plus a coarse arc length over the same bounds
//!
//! Shared preconditions: h1 > 0, b > 0, h2 > 0, tStudy >= 0, all finite.
//! Anything else is "not computable" and yields zeros rather than an error.

pub mod integrate;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::sanitize::{finite_or_zero, has_invalid_values, is_non_negative, is_positive};
use crate::types::{
    MentalBurden, PredictionInputs, PredictionResult, TestObservation, BURDEN_SUBINTERVALS,
    EFFORT_CURVE_EXPONENT, EFFORT_SUBINTERVALS, EFFORT_X_END_EXPONENT, EFFORT_X_START,
};

use integrate::trapezoid;

// ==================== Preconditions ====================

/// h1 > 0, b > 0, h2 > 0, tStudy >= 0 and every parameter finite
pub fn is_computable(inputs: &PredictionInputs) -> bool {
    let PredictionInputs {
        h1,
        h2,
        h3,
        b,
        t_study,
        t_test,
        t_rec,
    } = *inputs;

    !has_invalid_values(&[h1, h2, h3, b, t_study, t_test, t_rec])
        && is_positive(h1)
        && is_positive(b)
        && is_positive(h2)
        && is_non_negative(t_study)
}

// ==================== Volume Projections ====================

/// Straight proportional extrapolation of the last delta
pub fn linear_volume(inputs: &PredictionInputs) -> f64 {
    if !is_computable(inputs) {
        return 0.0;
    }
    finite_or_zero(inputs.b / inputs.h2 * inputs.h3)
}

/// Total effective volume implied by moving from h1 to h1 + h2
fn bucket_size(h1: f64, h2: f64, b: f64) -> Option<f64> {
    let ratio1 = ((h1 + h2) / h1).powi(3);
    let growth = ratio1 - 1.0;
    // h2 > 0, so only rounding can collapse the growth to zero
    if !is_positive(growth) {
        return None;
    }
    Some(b + b / growth)
}

/// Volume needed under the cube-root growth model, floored at 0
pub fn cubic_volume(inputs: &PredictionInputs) -> f64 {
    if !is_computable(inputs) {
        return 0.0;
    }
    let PredictionInputs { h1, h2, h3, b, .. } = *inputs;

    let Some(bucket) = bucket_size(h1, h2, b) else {
        return 0.0;
    };
    let ratio2 = ((h1 + h2 + h3) / (h1 + h2)).powi(3);

    finite_or_zero(bucket * (ratio2 - 1.0)).max(0.0)
}

// ==================== Effort Curve ====================

/// Amplitude C of the effort curve y = C * x^0.4.
///
/// The volume-ratio factor equals `bucket / b` from the cubic model, so both
/// models share one notion of accumulated volume. Returns 0 when the inputs
/// are not computable.
pub fn density_coefficient(inputs: &PredictionInputs) -> f64 {
    if !is_computable(inputs) {
        return 0.0;
    }
    let PredictionInputs { h1, h2, b, t_study, .. } = *inputs;

    let sum_cube = (h1 + h2).powi(3);
    let denominator = sum_cube - h1.powi(3);
    if !is_positive(denominator) {
        return 0.0;
    }

    finite_or_zero(sum_cube / denominator * (t_study / b))
}

/// Integration interval on the normalized progress axis.
///
/// `None` when tRec is not positive or the interval is empty
/// (x_end <= x_start, typically a test finished well under the recommended
/// time).
pub fn effort_bounds(t_test: f64, t_rec: f64) -> Option<(f64, f64)> {
    if !is_positive(t_rec) || !is_non_negative(t_test) {
        return None;
    }
    let k = t_test / t_rec;
    let x_end = k.powf(EFFORT_X_END_EXPONENT) + 1.0;

    if x_end.is_finite() && x_end > EFFORT_X_START {
        Some((EFFORT_X_START, x_end))
    } else {
        None
    }
}

fn arc_length(c: f64, x_start: f64, x_end: f64, subintervals: usize) -> f64 {
    let integrand = |x: f64| {
        let slope = EFFORT_CURVE_EXPONENT * c * x.powf(EFFORT_CURVE_EXPONENT - 1.0);
        (1.0 + slope * slope).sqrt()
    };
    finite_or_zero(trapezoid(integrand, x_start, x_end, subintervals))
}

// ==================== Predictor ====================

/// Predictor with its integration precision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePredictor {
    effort_subintervals: usize,
    burden_subintervals: usize,
}

impl Default for PerformancePredictor {
    fn default() -> Self {
        Self {
            effort_subintervals: EFFORT_SUBINTERVALS,
            burden_subintervals: BURDEN_SUBINTERVALS,
        }
    }
}

impl PerformancePredictor {
    /// Subinterval counts below the precision floors are raised to them
    pub fn new(effort_subintervals: usize, burden_subintervals: usize) -> Self {
        Self {
            effort_subintervals: effort_subintervals.max(EFFORT_SUBINTERVALS),
            burden_subintervals: burden_subintervals.max(BURDEN_SUBINTERVALS),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.effort_subintervals, config.burden_subintervals)
    }

    pub fn effort_subintervals(&self) -> usize {
        self.effort_subintervals
    }

    pub fn burden_subintervals(&self) -> usize {
        self.burden_subintervals
    }

    /// Arc length of the fitted effort curve; 0 when not computable
    pub fn effort_index(&self, inputs: &PredictionInputs) -> f64 {
        if !is_computable(inputs) {
            return 0.0;
        }
        let Some((x_start, x_end)) = effort_bounds(inputs.t_test, inputs.t_rec) else {
            return 0.0;
        };
        let c = density_coefficient(inputs);
        arc_length(c, x_start, x_end, self.effort_subintervals)
    }

    /// Entry cost plus a coarse arc length, used as a review-priority weight
    pub fn mental_burden(&self, inputs: &PredictionInputs) -> MentalBurden {
        if !is_computable(inputs) {
            return MentalBurden::default();
        }
        let c = density_coefficient(inputs);
        let initial = finite_or_zero(c * EFFORT_X_START.powf(EFFORT_CURVE_EXPONENT));
        let arc = effort_bounds(inputs.t_test, inputs.t_rec)
            .map(|(x_start, x_end)| arc_length(c, x_start, x_end, self.burden_subintervals))
            .unwrap_or(0.0);

        MentalBurden {
            total: initial + arc,
            initial,
            arc_length: arc,
        }
    }

    /// All projections for one observation pair and target delta
    pub fn predict(&self, inputs: &PredictionInputs) -> PredictionResult {
        if !is_computable(inputs) {
            debug!(
                h1 = inputs.h1,
                h2 = inputs.h2,
                b = inputs.b,
                "Prediction not computable for observation pair"
            );
            return PredictionResult::not_computable();
        }

        PredictionResult {
            computable: true,
            linear_volume: linear_volume(inputs),
            cubic_volume: cubic_volume(inputs),
            effort_index: self.effort_index(inputs),
            density_coefficient: density_coefficient(inputs),
            mental_burden: self.mental_burden(inputs),
        }
    }
}

/// Effort index at the default 2000-subinterval precision
pub fn effort_index(inputs: &PredictionInputs) -> f64 {
    PerformancePredictor::default().effort_index(inputs)
}

/// Mental burden at the default 50-subinterval precision
pub fn mental_burden(inputs: &PredictionInputs) -> MentalBurden {
    PerformancePredictor::default().mental_burden(inputs)
}

// ==================== Analysis Spaces ====================

/// Aggregate view over the observations of one analysis space
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceSummary {
    pub count: usize,
    pub average_score: f64,
    /// Mean of score gain per unit volume over adjacent pairs with b > 0;
    /// `None` with fewer than two observations
    pub average_increase_rate: Option<f64>,
    pub latest: Option<TestObservation>,
    pub previous: Option<TestObservation>,
    /// tRec - tTest of the latest observation (minutes saved)
    pub latest_time_margin: Option<f64>,
}

/// Summary plus the prediction for the latest pair, if any
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceReport {
    pub summary: SpaceSummary,
    pub prediction: Option<PredictionResult>,
}

fn ordered(observations: &[TestObservation]) -> Vec<&TestObservation> {
    let mut sorted: Vec<&TestObservation> = observations.iter().collect();
    sorted.sort_by_key(|o| o.observed_at);
    sorted
}

pub fn summarize_space(observations: &[TestObservation]) -> SpaceSummary {
    let sorted = ordered(observations);
    let Some(&latest) = sorted.last() else {
        return SpaceSummary::default();
    };

    let count = sorted.len();
    let average_score = sorted.iter().map(|o| finite_or_zero(o.score)).sum::<f64>() / count as f64;

    let average_increase_rate = if count >= 2 {
        let rates: Vec<f64> = sorted
            .windows(2)
            .filter(|pair| is_positive(pair[1].volume_invested))
            .map(|pair| (pair[1].score - pair[0].score) / pair[1].volume_invested)
            .filter(|rate| rate.is_finite())
            .collect();
        Some(if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        })
    } else {
        None
    };

    SpaceSummary {
        count,
        average_score,
        average_increase_rate,
        latest: Some(latest.clone()),
        previous: count.checked_sub(2).map(|i| sorted[i].clone()),
        latest_time_margin: Some(latest.test_minutes_recommended - latest.test_minutes_actual),
    }
}

/// Summarize a space and predict from its two most recent observations
pub fn analyze_space(
    predictor: &PerformancePredictor,
    observations: &[TestObservation],
    h3: f64,
) -> SpaceReport {
    let summary = summarize_space(observations);
    let prediction = match (&summary.previous, &summary.latest) {
        (Some(previous), Some(latest)) => {
            Some(predictor.predict(&PredictionInputs::from_pair(previous, latest, h3)))
        }
        _ => None,
    };

    SpaceReport {
        summary,
        prediction,
    }
}
