use crate::aggregate::sum_totals;
use crate::deviation::{ai_vs_original_pct, improvement, ratio_pct};
use crate::model::{DisciplineResult, OverallSummary};

/// Roll per-discipline results up into cross-discipline totals.
///
/// Counts add up across disciplines, so `total_complete` can exceed the
/// number of unique tickets when a ticket is complete in several disciplines.
pub fn summarize(results: &[DisciplineResult], unique_tickets: usize) -> OverallSummary {
    let totals = sum_totals(results);

    let mut total_complete = 0;
    let mut total_partial = 0;
    let mut total_missing = 0;
    let mut total_excluded = 0;
    for r in results {
        total_complete += r.complete_count;
        total_partial += r.partial_count;
        total_missing += r.missing_count;
        total_excluded += r.excluded_count;
    }

    let scores = if total_complete > 0 {
        improvement(totals.original, totals.ai, totals.actual)
    } else {
        Default::default()
    };

    OverallSummary {
        total_unique_tickets: unique_tickets,
        total_complete,
        total_partial,
        total_missing,
        total_excluded,
        original_total: totals.original,
        ai_total: totals.ai,
        actual_total: totals.actual,
        completion_rate_pct: ratio_pct(total_complete as f64, unique_tickets as f64),
        ai_vs_original_pct: ai_vs_original_pct(totals.original, totals.ai),
        original_vs_actual_pct: scores.original_vs_actual,
        ai_vs_actual_pct: scores.ai_vs_actual,
        improvement_pct: scores.overall_improvement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, counts: (usize, usize, usize), totals: (f64, f64, f64)) -> DisciplineResult {
        DisciplineResult {
            discipline: name.into(),
            total_tickets: counts.0 + counts.1 + counts.2,
            complete_count: counts.0,
            partial_count: counts.1,
            missing_count: counts.2,
            excluded_count: 0,
            original_total: totals.0,
            ai_total: totals.1,
            actual_total: totals.2,
            original_vs_actual_pct: 0.0,
            ai_vs_actual_pct: 0.0,
            improvement_pct: 0.0,
            completion_rate_pct: 0.0,
            ai_vs_original_pct: 0.0,
            missing_details: Vec::new(),
            excluded: Vec::new(),
        }
    }

    #[test]
    fn summary_adds_counts_and_totals() {
        let results = vec![
            result("QA", (2, 1, 1), (6.0, 5.0, 5.0)),
            result("BE", (1, 2, 1), (4.0, 3.0, 3.0)),
        ];
        let s = summarize(&results, 4);
        assert_eq!(s.total_complete, 3);
        assert_eq!(s.total_partial, 3);
        assert_eq!(s.total_missing, 2);
        assert_eq!(s.original_total, 10.0);
        assert_eq!(s.ai_total, 8.0);
        assert_eq!(s.actual_total, 8.0);
        assert!((s.completion_rate_pct - 75.0).abs() < 1e-9);
        assert!((s.ai_vs_original_pct - 20.0).abs() < 1e-9);
        assert!((s.original_vs_actual_pct - 25.0).abs() < 1e-9);
        assert_eq!(s.improvement_pct, 100.0);
    }

    #[test]
    fn summary_is_order_independent() {
        let a = result("QA", (2, 1, 1), (6.0, 5.0, 5.0));
        let b = result("BE", (1, 2, 1), (4.0, 3.0, 3.0));
        assert_eq!(
            summarize(&[a.clone(), b.clone()], 4),
            summarize(&[b, a], 4)
        );
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let s = summarize(&[], 0);
        assert_eq!(s, OverallSummary::default());
    }
}
