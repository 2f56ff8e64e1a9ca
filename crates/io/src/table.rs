// Grid → TicketTable conversion shared by the CSV and Excel loaders

use std::collections::HashMap;

use log::{debug, info};
use sprintlens_recon::config::InputConfig;
use sprintlens_recon::model::{Cell, TicketRow, TicketTable};

use crate::error::IoError;

/// Raw rows as read from a file, before the banner rows are skipped.
pub type Grid = Vec<Vec<Option<Cell>>>;

/// Build a ticket table from a grid: skip banner rows, read the header row,
/// drop rows whose key is blank.
pub fn build_table(grid: Grid, input: &InputConfig) -> Result<TicketTable, IoError> {
    let available = grid.len();
    let mut rows = grid.into_iter().skip(input.skip_rows);

    let header_row = rows.next().ok_or(IoError::MissingHeader {
        row: input.skip_rows + 1,
        available,
    })?;
    let headers = header_names(&header_row);

    let key_idx = headers
        .iter()
        .position(|h| h == &input.key_column)
        .ok_or_else(|| IoError::MissingKeyColumn(input.key_column.clone()))?;
    let assignee_idx = headers.iter().position(|h| h == &input.assignee_column);

    let mut tickets = Vec::new();
    let mut dropped = 0usize;

    for (offset, cells) in rows.enumerate() {
        // 1-based line number as shown in a spreadsheet
        let line = input.skip_rows + 2 + offset;

        let key = cells
            .get(key_idx)
            .cloned()
            .flatten()
            .and_then(Cell::normalized)
            .map(|c| number_or_text(&c));
        let Some(key) = key.filter(|k| !k.trim().is_empty()) else {
            debug!("row {line}: blank key, dropped");
            dropped += 1;
            continue;
        };

        let mut row = TicketRow::new(key);
        if let Some(Some(cell)) = assignee_idx.and_then(|i| cells.get(i)) {
            if let Some(assignee) = cell.clone().normalized() {
                row = row.with_assignee(number_or_text(&assignee));
            }
        }
        for (cell, header) in cells.into_iter().zip(&headers) {
            if let Some(cell) = cell {
                row.cells.insert(header.clone(), cell);
            }
        }
        tickets.push(row);
    }

    if dropped > 0 {
        info!("dropped {dropped} row(s) with a blank key");
    }

    Ok(TicketTable::new(headers, tickets)?)
}

/// Header labels; blank headers get a positional name and repeats get a
/// numeric suffix so every column stays addressable.
fn header_names(header_row: &[Option<Cell>]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = match cell {
                Some(c) => number_or_text(c).trim().to_string(),
                None => String::new(),
            };
            let base = if base.is_empty() { format!("Unnamed: {i}") } else { base };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 { base } else { format!("{base}.{count}") };
            *count += 1;
            name
        })
        .collect()
}

/// Render a cell as text, printing integral numbers without a decimal point.
pub fn number_or_text(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Cell::Number(n) => format!("{n}"),
        Cell::Text(s) => s.trim().to_string(),
    }
}
