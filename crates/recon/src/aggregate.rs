use std::collections::BTreeSet;

use crate::config::DisciplineMapping;
use crate::error::ReconError;
use crate::model::{DisciplineResult, ExcludedTicket, Totals, TicketRow, TicketTable};

/// Read a present cell as a finite number. Absent cells read as `None`.
pub fn read_value(row: &TicketRow, column: &str) -> Result<Option<f64>, ReconError> {
    let Some(cell) = row.cell(column) else {
        return Ok(None);
    };
    cell.as_number()
        .map(Some)
        .ok_or_else(|| ReconError::DataFormat {
            ticket_key: row.key.clone(),
            column: column.to_string(),
            value: cell.raw(),
        })
}

/// Sum original / AI / actual over the complete tickets of one discipline.
///
/// Keys are visited in sorted order so the floating-point sum does not depend
/// on the row order of the export.
pub fn aggregate(
    table: &TicketTable,
    mapping: &DisciplineMapping,
    complete: &BTreeSet<String>,
) -> Result<Totals, ReconError> {
    mapping.resolve(table)?;

    let mut totals = Totals::default();
    for key in complete {
        let Some(row) = table.get(key) else {
            continue;
        };
        // Read all three before adding so a malformed value leaves no partial sum.
        let mut values = [0.0; 3];
        for (slot, (_, column)) in values.iter_mut().zip(mapping.columns()) {
            *slot = read_value(row, column)?.unwrap_or(0.0);
        }
        for (value, (kind, _)) in values.into_iter().zip(mapping.columns()) {
            totals.add(kind, value);
        }
    }
    Ok(totals)
}

/// Sum every present value over `keys`, whatever their completeness.
pub fn aggregate_present(
    table: &TicketTable,
    mapping: &DisciplineMapping,
    keys: &BTreeSet<String>,
) -> Result<Totals, ReconError> {
    mapping.resolve(table)?;

    let mut totals = Totals::default();
    for key in keys {
        let Some(row) = table.get(key) else {
            continue;
        };
        for (kind, column) in mapping.columns() {
            if let Some(value) = read_value(row, column)? {
                totals.add(kind, value);
            }
        }
    }
    Ok(totals)
}

/// Find tickets with a present but non-numeric value in any mapped column.
///
/// Only the first offending column of each ticket is reported. Rows are
/// visited in table order.
pub fn screen_values(table: &TicketTable, mapping: &DisciplineMapping) -> Vec<ExcludedTicket> {
    let mut excluded = Vec::new();
    for row in table.rows() {
        for (_, column) in mapping.columns() {
            if let Err(ReconError::DataFormat { ticket_key, column, value }) = read_value(row, column) {
                excluded.push(ExcludedTicket { ticket_key, column, value });
                break;
            }
        }
    }
    excluded
}

/// Elementwise sum of per-discipline totals.
pub fn sum_totals(results: &[DisciplineResult]) -> Totals {
    let mut totals = Totals::default();
    for r in results {
        totals += r.totals();
    }
    totals
}
