//! Percentage deviation and estimation-improvement math.
//!
//! Every ratio here is zero-guarded: a missing or zero baseline yields `0`
//! rather than an error or a non-finite number.

use crate::model::Improvement;

/// `(actual - original) / original * 100`, or `0` without a usable baseline.
pub fn percentage_diff(original: Option<f64>, actual: Option<f64>) -> f64 {
    match (original, actual) {
        (Some(o), Some(a)) if o != 0.0 && o.is_finite() && a.is_finite() => (a - o) / o * 100.0,
        _ => 0.0,
    }
}

/// `numerator / denominator * 100`, or `0` when the denominator is zero.
pub fn ratio_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// How far each estimate strayed from actual time, and the share of the
/// original estimate's error that the AI estimate eliminated (clamped to 0..=100).
///
/// Deviations are relative to `actual_total`.
pub fn improvement(original_total: f64, ai_total: f64, actual_total: f64) -> Improvement {
    if original_total == 0.0 || actual_total == 0.0 {
        return Improvement::default();
    }

    let original_deviation = (original_total - actual_total) / actual_total * 100.0;
    let ai_deviation = (ai_total - actual_total) / actual_total * 100.0;

    let original_error = original_deviation.abs();
    let ai_error = ai_deviation.abs();

    let overall_improvement = if original_error == 0.0 {
        0.0
    } else {
        ((original_error - ai_error) / original_error * 100.0).clamp(0.0, 100.0)
    };

    Improvement {
        original_vs_actual: original_deviation,
        ai_vs_actual: ai_deviation,
        overall_improvement,
    }
}

/// `(original - ai) / original * 100`: how much lower the AI estimate came in.
pub fn ai_vs_original_pct(original_total: f64, ai_total: f64) -> f64 {
    ratio_pct(original_total - ai_total, original_total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn percentage_diff_cases() {
        assert!(close(percentage_diff(Some(100.0), Some(120.0)), 20.0));
        assert!(close(percentage_diff(Some(100.0), Some(80.0)), -20.0));
        assert_eq!(percentage_diff(Some(0.0), Some(100.0)), 0.0);
        assert_eq!(percentage_diff(None, Some(100.0)), 0.0);
        assert_eq!(percentage_diff(Some(100.0), None), 0.0);
    }

    #[test]
    fn ai_overestimates_less() {
        let r = improvement(10.0, 8.5, 8.0);
        assert!(close(r.original_vs_actual, 25.0));
        assert!(close(r.ai_vs_actual, 6.25));
        assert!(close(r.overall_improvement, 75.0));
    }

    #[test]
    fn both_underestimate() {
        let r = improvement(8.0, 9.0, 10.0);
        assert!(close(r.original_vs_actual, -20.0));
        assert!(close(r.ai_vs_actual, -10.0));
        assert!(close(r.overall_improvement, 50.0));
    }

    #[test]
    fn perfect_ai_estimate() {
        let r = improvement(12.0, 10.0, 10.0);
        assert!(close(r.original_vs_actual, 20.0));
        assert_eq!(r.ai_vs_actual, 0.0);
        assert_eq!(r.overall_improvement, 100.0);
    }

    #[test]
    fn worse_ai_estimate_floors_at_zero() {
        let r = improvement(11.0, 15.0, 10.0);
        assert!(close(r.original_vs_actual, 10.0));
        assert!(close(r.ai_vs_actual, 50.0));
        assert_eq!(r.overall_improvement, 0.0);
    }

    #[test]
    fn perfect_original_leaves_no_room() {
        let r = improvement(10.0, 9.0, 10.0);
        assert_eq!(r.original_vs_actual, 0.0);
        assert_eq!(r.overall_improvement, 0.0);
    }

    #[test]
    fn zero_baselines_report_zero() {
        assert_eq!(improvement(0.0, 5.0, 5.0), Improvement::default());
        assert_eq!(improvement(5.0, 5.0, 0.0), Improvement::default());
        assert_eq!(ratio_pct(3.0, 0.0), 0.0);
        assert_eq!(ai_vs_original_pct(0.0, 4.0), 0.0);
        assert!(close(ai_vs_original_pct(10.0, 8.0), 20.0));
    }
}
