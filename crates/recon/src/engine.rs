use std::collections::BTreeSet;

use log::{debug, warn};

use crate::aggregate::{aggregate, aggregate_present, screen_values};
use crate::classify::classify;
use crate::config::{BadValuePolicy, DisciplineMapping, MissingColumnPolicy, ReconConfig, RunPolicy, TotalsMode};
use crate::deviation::{ai_vs_original_pct, improvement, ratio_pct};
use crate::error::{ErrorKind, ReconError};
use crate::missing::record_missing;
use crate::model::{DisciplineResult, Improvement, ReconMeta, ReconResult, SkippedDiscipline, TicketTable};
use crate::summary::summarize;

/// Reconcile every discipline in the config against one ticket table snapshot.
///
/// Disciplines are independent of each other; results keep schema order.
pub fn run(config: &ReconConfig, table: &TicketTable) -> Result<ReconResult, ReconError> {
    config.validate()?;

    let mut disciplines = Vec::with_capacity(config.schema.len());
    let mut skipped = Vec::new();

    for mapping in config.schema.iter() {
        match analyze_discipline(table, mapping, &config.policy) {
            Ok(result) => disciplines.push(result),
            Err(e)
                if e.kind() == ErrorKind::Configuration
                    && config.policy.on_missing_column == MissingColumnPolicy::SkipDiscipline =>
            {
                warn!("skipping discipline '{}': {e}", mapping.name);
                skipped.push(SkippedDiscipline {
                    discipline: mapping.name.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    let summary = summarize(&disciplines, table.len());

    Ok(ReconResult {
        meta: ReconMeta {
            schema_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            totals_mode: config.policy.totals,
        },
        summary,
        disciplines,
        skipped,
    })
}

/// Classify, aggregate and score one discipline.
pub fn analyze_discipline(
    table: &TicketTable,
    mapping: &DisciplineMapping,
    policy: &RunPolicy,
) -> Result<DisciplineResult, ReconError> {
    let mut buckets = classify(table, mapping)?;

    let excluded = match policy.on_bad_value {
        BadValuePolicy::Abort => Vec::new(),
        BadValuePolicy::ExcludeTicket => {
            let excluded = screen_values(table, mapping);
            for ticket in &excluded {
                warn!(
                    "discipline '{}': excluding ticket '{}' ({} = '{}')",
                    mapping.name, ticket.ticket_key, ticket.column, ticket.value
                );
                buckets.remove(&ticket.ticket_key);
            }
            excluded
        }
    };

    debug!(
        "discipline '{}': {} complete, {} partial, {} missing, {} excluded",
        mapping.name,
        buckets.complete.len(),
        buckets.partial.len(),
        buckets.missing.len(),
        excluded.len()
    );

    let totals = match policy.totals {
        TotalsMode::CompleteOnly => aggregate(table, mapping, &buckets.complete)?,
        TotalsMode::AllPresent => {
            let keys: BTreeSet<String> = buckets.complete.union(&buckets.partial).cloned().collect();
            aggregate_present(table, mapping, &keys)?
        }
    };

    let missing_details = record_missing(table, mapping, &buckets.partial)?;

    let scores = if buckets.complete.is_empty() {
        Improvement::default()
    } else {
        improvement(totals.original, totals.ai, totals.actual)
    };

    Ok(DisciplineResult {
        discipline: mapping.name.clone(),
        total_tickets: table.len(),
        complete_count: buckets.complete.len(),
        partial_count: buckets.partial.len(),
        missing_count: buckets.missing.len(),
        excluded_count: excluded.len(),
        original_total: totals.original,
        ai_total: totals.ai,
        actual_total: totals.actual,
        original_vs_actual_pct: scores.original_vs_actual,
        ai_vs_actual_pct: scores.ai_vs_actual,
        improvement_pct: scores.overall_improvement,
        completion_rate_pct: ratio_pct(buckets.complete.len() as f64, table.len() as f64),
        ai_vs_original_pct: ai_vs_original_pct(totals.original, totals.ai),
        missing_details,
        excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisciplineSchema;
    use crate::model::{Cell, TicketRow};

    fn config(disciplines: Vec<DisciplineMapping>) -> ReconConfig {
        ReconConfig {
            schema: DisciplineSchema::new(disciplines),
            ..ReconConfig::default()
        }
    }

    fn qa() -> DisciplineMapping {
        DisciplineMapping::new("QA", "qa_o", "qa_a", "qa_t")
    }

    fn be() -> DisciplineMapping {
        DisciplineMapping::new("BE", "be_o", "be_a", "be_t")
    }

    fn table() -> TicketTable {
        let cols = ["Key", "Assignee", "qa_o", "qa_a", "qa_t", "be_o", "be_a", "be_t"]
            .map(String::from)
            .to_vec();
        TicketTable::new(
            cols,
            vec![
                TicketRow::new("S-1")
                    .with_assignee("ana")
                    .with_cell("qa_o", 2.0)
                    .with_cell("qa_a", 1.5)
                    .with_cell("qa_t", 1.8)
                    .with_cell("be_o", 10.0)
                    .with_cell("be_a", 8.5)
                    .with_cell("be_t", 8.0),
                TicketRow::new("S-2")
                    .with_cell("qa_o", 3.0)
                    .with_cell("qa_a", 2.5)
                    .with_cell("qa_t", 2.8)
                    .with_cell("be_o", 4.0),
                TicketRow::new("S-3"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn run_two_disciplines() {
        let result = run(&config(vec![qa(), be()]), &table()).unwrap();
        assert_eq!(result.disciplines.len(), 2);

        let qa = result.discipline("QA").unwrap();
        assert_eq!((qa.complete_count, qa.partial_count, qa.missing_count), (2, 0, 1));
        assert!((qa.original_total - 5.0).abs() < 1e-9);
        assert!((qa.ai_total - 4.0).abs() < 1e-9);
        assert!((qa.actual_total - 4.6).abs() < 1e-9);

        let be = result.discipline("BE").unwrap();
        assert_eq!((be.complete_count, be.partial_count, be.missing_count), (1, 1, 1));
        assert!((be.original_vs_actual_pct - 25.0).abs() < 1e-9);
        assert!((be.ai_vs_actual_pct - 6.25).abs() < 1e-9);
        assert!((be.improvement_pct - 75.0).abs() < 1e-9);
        assert!((be.completion_rate_pct - 100.0 / 3.0).abs() < 1e-9);
        assert!((be.ai_vs_original_pct - 15.0).abs() < 1e-9);
        assert_eq!(be.missing_details.len(), 1);
        assert_eq!(be.missing_details[0].ticket_key, "S-2");

        assert_eq!(result.summary.total_unique_tickets, 3);
        assert_eq!(result.summary.total_complete, 3);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn no_complete_tickets_zeroes_scores() {
        let t = TicketTable::new(
            vec![],
            vec![
                TicketRow::new("T-1").with_cell("qa_o", 4.0).with_cell("qa_t", 3.8),
                TicketRow::new("T-2").with_cell("qa_a", 3.5).with_cell("qa_t", 3.8),
            ],
        )
        .unwrap();
        let r = analyze_discipline(&t, &qa(), &RunPolicy::default()).unwrap();
        assert_eq!((r.complete_count, r.partial_count, r.missing_count), (0, 2, 0));
        assert_eq!((r.original_total, r.ai_total, r.actual_total), (0.0, 0.0, 0.0));
        assert_eq!(r.original_vs_actual_pct, 0.0);
        assert_eq!(r.ai_vs_actual_pct, 0.0);
        assert_eq!(r.improvement_pct, 0.0);
    }

    #[test]
    fn all_present_mode_keeps_counts_but_widens_totals() {
        let policy = RunPolicy {
            totals: TotalsMode::AllPresent,
            ..RunPolicy::default()
        };
        let strict = analyze_discipline(&table(), &be(), &RunPolicy::default()).unwrap();
        let lenient = analyze_discipline(&table(), &be(), &policy).unwrap();
        assert_eq!(strict.complete_count, lenient.complete_count);
        assert_eq!(strict.missing_details, lenient.missing_details);
        assert!((strict.original_total - 10.0).abs() < 1e-9);
        assert!((lenient.original_total - 14.0).abs() < 1e-9);
    }

    #[test]
    fn missing_column_aborts_by_default() {
        let broken = DisciplineMapping::new("TA", "ta_o", "ta_a", "ta_t");
        let err = run(&config(vec![qa(), broken]), &table()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("'TA'"));
    }

    #[test]
    fn missing_column_can_skip_discipline() {
        let mut cfg = config(vec![qa(), DisciplineMapping::new("TA", "ta_o", "ta_a", "ta_t")]);
        cfg.policy.on_missing_column = MissingColumnPolicy::SkipDiscipline;
        let result = run(&cfg, &table()).unwrap();
        assert_eq!(result.disciplines.len(), 1);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].discipline, "TA");
        assert!(result.skipped[0].reason.contains("ta_o"));
    }

    #[test]
    fn bad_value_aborts_or_excludes() {
        let t = TicketTable::new(
            vec![],
            vec![
                TicketRow::new("G-1").with_cell("qa_o", 1.0).with_cell("qa_a", 1.0).with_cell("qa_t", 1.0),
                TicketRow::new("G-2")
                    .with_cell("qa_o", Cell::Text("#DIV/0!".into()))
                    .with_cell("qa_a", 1.0)
                    .with_cell("qa_t", 1.0),
            ],
        )
        .unwrap();

        let err = analyze_discipline(&t, &qa(), &RunPolicy::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataFormat);
        assert!(err.to_string().contains("G-2"));

        let policy = RunPolicy {
            on_bad_value: BadValuePolicy::ExcludeTicket,
            ..RunPolicy::default()
        };
        let r = analyze_discipline(&t, &qa(), &policy).unwrap();
        assert_eq!(r.complete_count, 1);
        assert_eq!(r.excluded_count, 1);
        assert_eq!(r.excluded[0].ticket_key, "G-2");
        assert_eq!(r.excluded[0].column, "qa_o");
        assert_eq!(
            r.complete_count + r.partial_count + r.missing_count + r.excluded_count,
            t.len()
        );
    }

    #[test]
    fn empty_inputs_are_zero_not_errors() {
        let empty = TicketTable::new(qa().columns().map(|(_, c)| c.to_string()).to_vec(), vec![]).unwrap();
        let result = run(&config(vec![qa()]), &empty).unwrap();
        assert_eq!(result.disciplines[0].completion_rate_pct, 0.0);
        assert_eq!(result.summary.completion_rate_pct, 0.0);

        let result = run(&config(vec![]), &table()).unwrap();
        assert!(result.disciplines.is_empty());
        assert_eq!(result.summary.total_unique_tickets, 3);
        assert_eq!(result.summary.improvement_pct, 0.0);
        assert!(!result.has_complete_data());
    }

    #[test]
    fn rerun_is_identical() {
        let cfg = config(vec![qa(), be()]);
        let t = table();
        assert_eq!(run(&cfg, &t).unwrap(), run(&cfg, &t).unwrap());
    }
}
