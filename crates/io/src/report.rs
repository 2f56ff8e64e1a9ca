// Shared helpers for the report writers

use std::collections::BTreeSet;

use sprintlens_recon::model::{EstimateKind, MissingDetail, ReconResult};

pub const MISSING_HEADERS: [&str; 8] = [
    "Discipline",
    "Key",
    "Assignee",
    "Missing Fields",
    "Present Fields",
    "Original Estimate",
    "AI Estimate",
    "Actual Time",
];

/// `"Original Estimate, Actual Time"` style field list.
pub fn join_kinds(kinds: &BTreeSet<EstimateKind>) -> String {
    kinds.iter().map(|k| k.label()).collect::<Vec<_>>().join(", ")
}

/// Missing details across all disciplines, sorted by discipline then ticket key.
pub fn sorted_missing(result: &ReconResult) -> Vec<(&str, &MissingDetail)> {
    let mut rows: Vec<(&str, &MissingDetail)> = result
        .disciplines
        .iter()
        .flat_map(|d| d.missing_details.iter().map(move |m| (d.discipline.as_str(), m)))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.ticket_key.cmp(&b.1.ticket_key)));
    rows
}

/// Short stderr summary of a run.
pub fn human_summary(result: &ReconResult) -> String {
    let s = &result.summary;
    let mut out = format!(
        "{} tickets across {} discipline(s): {} complete, {} partial, {} missing data points ({:.1}% completion)\n\
         totals (hours): original {:.2}, AI {:.2}, actual {:.2}; AI vs original {:.1}%, improvement {:.1}%",
        s.total_unique_tickets,
        result.disciplines.len(),
        s.total_complete,
        s.total_partial,
        s.total_missing,
        s.completion_rate_pct,
        s.original_total,
        s.ai_total,
        s.actual_total,
        s.ai_vs_original_pct,
        s.improvement_pct,
    );
    for d in &result.disciplines {
        out.push_str(&format!(
            "\n  {:<6} n={:<4} original {:>8.2}  AI {:>8.2}  actual {:>8.2}  improvement {:>5.1}%",
            d.discipline, d.complete_count, d.original_total, d.ai_total, d.actual_total, d.improvement_pct,
        ));
    }
    if s.total_excluded > 0 {
        out.push_str(&format!("\n{} ticket(s) excluded for malformed values", s.total_excluded));
    }
    for skipped in &result.skipped {
        out.push_str(&format!("\nskipped {}: {}", skipped.discipline, skipped.reason));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprintlens_recon::config::{DisciplineMapping, DisciplineSchema, ReconConfig};
    use sprintlens_recon::model::{TicketRow, TicketTable};

    fn result() -> ReconResult {
        let config = ReconConfig {
            schema: DisciplineSchema::new(vec![
                DisciplineMapping::new("TA", "ta_o", "ta_a", "ta_t"),
                DisciplineMapping::new("BA", "ba_o", "ba_a", "ba_t"),
            ]),
            ..ReconConfig::default()
        };
        let table = TicketTable::new(
            ["ta_o", "ta_a", "ta_t", "ba_o", "ba_a", "ba_t"].map(String::from).to_vec(),
            vec![
                TicketRow::new("Z-2").with_cell("ta_o", 1.0).with_cell("ba_a", 1.0),
                TicketRow::new("A-1").with_cell("ta_t", 1.0).with_cell("ba_o", 2.0),
            ],
        )
        .unwrap();
        sprintlens_recon::run(&config, &table).unwrap()
    }

    #[test]
    fn missing_rows_sorted_by_discipline_then_key() {
        let r = result();
        let order: Vec<(&str, &str)> = sorted_missing(&r)
            .into_iter()
            .map(|(d, m)| (d, m.ticket_key.as_str()))
            .collect();
        assert_eq!(order, [("BA", "A-1"), ("BA", "Z-2"), ("TA", "A-1"), ("TA", "Z-2")]);
    }

    #[test]
    fn summary_mentions_each_discipline() {
        let text = human_summary(&result());
        assert!(text.starts_with("2 tickets across 2 discipline(s)"));
        assert!(text.contains("\n  TA "));
        assert!(text.contains("\n  BA "));
    }
}
