//! Data Sanitization
//!
//! Numeric guards applied before any division or power in the analytics code.
//!
//! Functions:
//! - Invalid value detection (NaN / Inf)
//! - Strict positivity checks
//! - Finite fallbacks for derived results

/// 检查数组是否包含无效值 (NaN 或 Inf)
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Finite and strictly greater than zero
pub fn is_positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

/// Finite and not negative
pub fn is_non_negative(x: f64) -> bool {
    x.is_finite() && x >= 0.0
}

/// Replace NaN / Inf with 0.0
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}
