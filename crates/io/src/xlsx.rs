// Excel ticket import (xlsx, xlsm, xls, xlsb, ods) and report export (xlsx only)
//
// Import: the first sheet (or the configured one) is read into a grid and
// handed to the shared table builder.
// Export: presentation snapshot of a finished run. Never read back.

use std::path::Path;

use calamine::{open_workbook_auto, CellErrorType, Data, Reader, Sheets};
use log::debug;
use rust_xlsxwriter::{
    Chart, ChartType, Color, Format, FormatAlign, Workbook as XlsxWorkbook, Worksheet,
};
use sprintlens_recon::config::InputConfig;
use sprintlens_recon::model::{Cell, EstimateKind, ReconResult, TicketTable};

use crate::error::IoError;
use crate::report::{join_kinds, sorted_missing, MISSING_HEADERS};
use crate::table::{build_table, number_or_text, Grid};

pub const SUMMARY_SHEET: &str = "Summary";
pub const ANALYSIS_SHEET: &str = "Analysis";
pub const MISSING_SHEET: &str = "Missing Data";
pub const ORIGINAL_SHEET: &str = "Original Data";

const GREEN: u32 = 0x90EE90;
const RED: u32 = 0xFFB6C1;
const YELLOW: u32 = 0xFFEB9C;
const HEADER_FILL: u32 = 0xD9E1F2;

/// Widest column the report will size to, in characters.
const MAX_COLUMN_WIDTH: usize = 50;

// ============================================================================
// Import
// ============================================================================

pub fn import(path: &Path, input: &InputConfig) -> Result<TicketTable, IoError> {
    let grid = read_grid(path, input.sheet.as_deref())?;
    build_table(grid, input)
}

/// Read one sheet into a dense grid anchored at A1.
pub fn read_grid(path: &Path, sheet: Option<&str>) -> Result<Grid, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| IoError::Workbook(format!("failed to open {}: {}", path.display(), e)))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| IoError::Workbook(format!("{} contains no sheets", path.display())))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IoError::Workbook(format!("failed to read sheet '{}': {}", sheet_name, e)))?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    debug!(
        "sheet '{}': {:?} cells starting at ({}, {})",
        sheet_name,
        range.get_size(),
        start_row,
        start_col
    );

    let mut grid: Grid = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells: Vec<Option<Cell>> = vec![None; start_col as usize];
        cells.extend(row.iter().map(to_cell));
        grid.push(cells);
    }
    Ok(grid)
}

fn to_cell(data: &Data) -> Option<Cell> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(Cell::Text(s.clone())),
        Data::Float(n) => Some(Cell::Number(*n)),
        Data::Int(n) => Some(Cell::Number(*n as f64)),
        Data::Bool(b) => Some(Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string())),
        // #N/A means no value; other errors stay as text and fail numeric coercion
        Data::Error(CellErrorType::NA) => None,
        Data::Error(e) => Some(Cell::Text(e.to_string())),
        Data::DateTime(dt) => Some(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Cell::Text(s.clone())),
    }
}

// ============================================================================
// Export
// ============================================================================

/// Write the analysis workbook: Summary, Analysis (with chart), Missing Data
/// when any ticket is partial, and the loaded table echoed as Original Data.
pub fn export(result: &ReconResult, table: &TicketTable, path: &Path) -> Result<(), IoError> {
    let mut workbook = XlsxWorkbook::new();

    write_summary(workbook.add_worksheet().set_name(SUMMARY_SHEET)?, result)?;
    write_analysis(workbook.add_worksheet().set_name(ANALYSIS_SHEET)?, result)?;

    let missing = sorted_missing(result);
    if !missing.is_empty() {
        let sheet = workbook.add_worksheet().set_name(MISSING_SHEET)?;
        write_missing(sheet, &missing)?;
    }

    write_original(workbook.add_worksheet().set_name(ORIGINAL_SHEET)?, table)?;

    workbook.save(path)?;
    debug!("report written to {}", path.display());
    Ok(())
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL))
}

fn fill(color: u32) -> Format {
    Format::new().set_background_color(Color::RGB(color))
}

/// Green when the AI estimate came in lower than the original, red otherwise.
fn diff_fill(pct: f64) -> Format {
    fill(if pct > 0.0 { GREEN } else { RED })
}

fn write_header(sheet: &mut Worksheet, row: u32, headers: &[&str]) -> Result<(), IoError> {
    let format = header_format();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *header, &format)?;
    }
    Ok(())
}

fn write_summary(sheet: &mut Worksheet, result: &ReconResult) -> Result<(), IoError> {
    let title = Format::new()
        .set_bold()
        .set_font_size(14)
        .set_align(FormatAlign::Center);
    let bold = Format::new().set_bold();
    let two_dp = Format::new().set_num_format("0.00");

    sheet.merge_range(0, 0, 0, 4, &result.meta.schema_name, &title)?;

    let s = &result.summary;
    sheet.write_string_with_format(2, 0, "Overall Statistics", &bold)?;
    let stats: [(&str, f64); 10] = [
        ("Total Tickets", s.total_unique_tickets as f64),
        ("Complete Data Points", s.total_complete as f64),
        ("Partial Data Points", s.total_partial as f64),
        ("Missing Data Points", s.total_missing as f64),
        ("Completion Rate (%)", s.completion_rate_pct),
        ("Original Estimate (Total)", s.original_total),
        ("AI Estimate (Total)", s.ai_total),
        ("Actual Time (Total)", s.actual_total),
        ("AI vs Original (%)", s.ai_vs_original_pct),
        ("Overall Improvement (%)", s.improvement_pct),
    ];
    for (i, (label, value)) in stats.iter().enumerate() {
        let row = 3 + i as u32;
        sheet.write_string(row, 0, *label)?;
        sheet.write_number_with_format(row, 1, *value, &two_dp)?;
    }

    let mut row = 4 + stats.len() as u32;
    sheet.write_string_with_format(row, 0, "Discipline Analysis", &bold)?;
    row += 1;
    write_header(
        sheet,
        row,
        &[
            "Discipline",
            "Complete",
            "Partial",
            "Missing",
            "Completion Rate (%)",
            "Original Est. (Total)",
            "AI Est. (Total)",
            "Actual (Total)",
            "AI vs Original Diff (%)",
        ],
    )?;

    for d in &result.disciplines {
        row += 1;
        sheet.write_string(row, 0, &d.discipline)?;
        sheet.write_number(row, 1, d.complete_count as f64)?;
        sheet.write_number(row, 2, d.partial_count as f64)?;
        sheet.write_number(row, 3, d.missing_count as f64)?;
        sheet.write_number_with_format(row, 4, d.completion_rate_pct, &two_dp)?;
        sheet.write_number_with_format(row, 5, d.original_total, &two_dp)?;
        sheet.write_number_with_format(row, 6, d.ai_total, &two_dp)?;
        sheet.write_number_with_format(row, 7, d.actual_total, &two_dp)?;
        sheet.write_number_with_format(
            row,
            8,
            d.ai_vs_original_pct,
            &diff_fill(d.ai_vs_original_pct).set_num_format("0.0"),
        )?;
    }

    sheet.set_column_width(0, 28)?;
    for col in 1..9u16 {
        sheet.set_column_width(col, 20)?;
    }
    Ok(())
}

fn write_analysis(sheet: &mut Worksheet, result: &ReconResult) -> Result<(), IoError> {
    let two_dp = Format::new().set_num_format("0.00");
    write_header(
        sheet,
        0,
        &[
            "Discipline",
            "Complete Data Points",
            "Partial Data Points",
            "Missing Data Points",
            "Original Estimate (Total)",
            "AI Estimate (Total)",
            "Actual Time (Total)",
            "Original vs Actual (%)",
            "AI vs Actual (%)",
            "Improvement (%)",
        ],
    )?;

    for (i, d) in result.disciplines.iter().enumerate() {
        let row = 1 + i as u32;
        sheet.write_string(row, 0, &d.discipline)?;
        sheet.write_number(row, 1, d.complete_count as f64)?;
        sheet.write_number(row, 2, d.partial_count as f64)?;
        sheet.write_number(row, 3, d.missing_count as f64)?;
        let values = [
            d.original_total,
            d.ai_total,
            d.actual_total,
            d.original_vs_actual_pct,
            d.ai_vs_actual_pct,
            d.improvement_pct,
        ];
        for (j, value) in values.iter().enumerate() {
            sheet.write_number_with_format(row, 4 + j as u16, *value, &two_dp)?;
        }
    }
    for col in 0..10u16 {
        sheet.set_column_width(col, 22)?;
    }

    if result.disciplines.is_empty() {
        return Ok(());
    }

    // Clustered columns: one series per estimate kind, one category per discipline
    let last = result.disciplines.len() as u32;
    let mut chart = Chart::new(ChartType::Column);
    for (offset, kind) in EstimateKind::ALL.iter().enumerate() {
        let col = 4 + offset as u16;
        chart
            .add_series()
            .set_name(kind.label())
            .set_categories((ANALYSIS_SHEET, 1, 0, last, 0))
            .set_values((ANALYSIS_SHEET, 1, col, last, col));
    }
    chart.title().set_name("Estimates vs Actual by Discipline");
    chart.x_axis().set_name("Discipline");
    chart.y_axis().set_name("Hours");
    sheet.insert_chart(last + 2, 0, &chart)?;
    Ok(())
}

fn write_missing(
    sheet: &mut Worksheet,
    rows: &[(&str, &sprintlens_recon::model::MissingDetail)],
) -> Result<(), IoError> {
    write_header(sheet, 0, &MISSING_HEADERS)?;
    let yellow = fill(YELLOW);
    let yellow_two_dp = fill(YELLOW).set_num_format("0.00");

    let mut widths: Vec<usize> = MISSING_HEADERS.iter().map(|h| h.len()).collect();
    for (i, (discipline, detail)) in rows.iter().enumerate() {
        let row = 1 + i as u32;
        let text = [
            discipline.to_string(),
            detail.ticket_key.clone(),
            detail.assignee.clone(),
            join_kinds(&detail.missing_fields),
            join_kinds(&detail.present_fields),
        ];
        for (col, value) in text.iter().enumerate() {
            sheet.write_string_with_format(row, col as u16, value, &yellow)?;
            widths[col] = widths[col].max(value.chars().count());
        }
        for (offset, kind) in EstimateKind::ALL.iter().enumerate() {
            let col = text.len() as u16 + offset as u16;
            match detail.values.get(kind) {
                Some(v) => sheet.write_number_with_format(row, col, *v, &yellow_two_dp)?,
                None => sheet.write_blank(row, col, &yellow)?,
            };
        }
    }
    set_widths(sheet, &widths)
}

fn write_original(sheet: &mut Worksheet, table: &TicketTable) -> Result<(), IoError> {
    let columns = table.columns();
    write_header(sheet, 0, &columns.iter().map(String::as_str).collect::<Vec<_>>())?;

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for (i, ticket) in table.rows().iter().enumerate() {
        let row = 1 + i as u32;
        for (col, name) in columns.iter().enumerate() {
            let Some(cell) = ticket.cell(name) else { continue };
            match cell {
                Cell::Number(n) => sheet.write_number(row, col as u16, *n)?,
                Cell::Text(s) => sheet.write_string(row, col as u16, s)?,
            };
            widths[col] = widths[col].max(number_or_text(cell).chars().count());
        }
    }
    set_widths(sheet, &widths)
}

fn set_widths(sheet: &mut Worksheet, widths: &[usize]) -> Result<(), IoError> {
    for (col, width) in widths.iter().enumerate() {
        let width = (width + 2).min(MAX_COLUMN_WIDTH);
        sheet.set_column_width(col as u16, width as f64)?;
    }
    Ok(())
}
