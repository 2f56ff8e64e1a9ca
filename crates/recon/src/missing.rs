use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::read_value;
use crate::classify::Presence;
use crate::config::DisciplineMapping;
use crate::error::ReconError;
use crate::model::{EstimateKind, MissingDetail, TicketTable};

/// Describe which values each partial ticket has and lacks, in table row order.
pub fn record_missing(
    table: &TicketTable,
    mapping: &DisciplineMapping,
    partial: &BTreeSet<String>,
) -> Result<Vec<MissingDetail>, ReconError> {
    mapping.resolve(table)?;

    let mut details = Vec::with_capacity(partial.len());
    for row in table.rows() {
        if !partial.contains(&row.key) {
            continue;
        }

        let presence = Presence::of(row, mapping);
        let (present_fields, missing_fields): (BTreeSet<EstimateKind>, BTreeSet<EstimateKind>) =
            EstimateKind::ALL.into_iter().partition(|&kind| presence.has(kind));

        let mut values = BTreeMap::new();
        for &kind in &present_fields {
            if let Some(value) = read_value(row, mapping.column(kind))? {
                values.insert(kind, value);
            }
        }

        details.push(MissingDetail {
            ticket_key: row.key.clone(),
            assignee: row.assignee_or_default().to_string(),
            missing_fields,
            present_fields,
            values,
        });
    }
    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::model::{TicketRow, UNASSIGNED};

    fn mapping() -> DisciplineMapping {
        DisciplineMapping::new("QA", "o", "a", "t")
    }

    #[test]
    fn details_follow_row_order_and_carry_values() {
        let t = TicketTable::new(
            vec!["Key".into(), "o".into(), "a".into(), "t".into()],
            vec![
                TicketRow::new("Z-9").with_assignee("dana").with_cell("o", 3.0).with_cell("t", 2.8),
                TicketRow::new("A-1").with_cell("o", 1.0).with_cell("a", 1.0).with_cell("t", 1.0),
                TicketRow::new("B-2").with_cell("a", 2.0),
                TicketRow::new("C-3"),
            ],
        )
        .unwrap();
        let b = classify(&t, &mapping()).unwrap();
        let details = record_missing(&t, &mapping(), &b.partial).unwrap();

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].ticket_key, "Z-9");
        assert_eq!(details[0].assignee, "dana");
        assert_eq!(
            details[0].missing_fields.iter().copied().collect::<Vec<_>>(),
            [EstimateKind::Ai]
        );
        assert_eq!(details[0].values.get(&EstimateKind::Original), Some(&3.0));
        assert_eq!(details[0].values.get(&EstimateKind::Actual), Some(&2.8));
        assert!(!details[0].values.contains_key(&EstimateKind::Ai));

        assert_eq!(details[1].ticket_key, "B-2");
        assert_eq!(details[1].assignee, UNASSIGNED);
        assert_eq!(details[1].present_fields.len(), 1);
        assert_eq!(details[1].missing_fields.len(), 2);
    }

    #[test]
    fn empty_partial_set_records_nothing() {
        let t = TicketTable::new(
            vec!["o".into(), "a".into(), "t".into()],
            vec![TicketRow::new("A-1")],
        )
        .unwrap();
        assert!(record_missing(&t, &mapping(), &BTreeSet::new()).unwrap().is_empty());
    }
}
