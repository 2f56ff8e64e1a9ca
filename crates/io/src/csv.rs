// CSV/TSV import of ticket exports, CSV export of missing details

use std::io::{Read, Write};
use std::path::Path;

use sprintlens_recon::config::InputConfig;
use sprintlens_recon::model::{Cell, EstimateKind, ReconResult, TicketTable};

use crate::error::IoError;
use crate::report::{join_kinds, sorted_missing, MISSING_HEADERS};
use crate::table::{build_table, Grid};

pub fn import(path: &Path, input: &InputConfig) -> Result<TicketTable, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, input)
}

pub fn import_from_string(content: &str, input: &InputConfig) -> Result<TicketTable, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(content))
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid: Grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(parse_field).collect());
    }
    build_table(grid, input)
}

fn parse_field(field: &str) -> Option<Cell> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(Cell::Number(n)),
        _ => Some(Cell::Text(field.to_string())),
    }
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    // Sample includes banner lines; scoring keys on the widest multi-field count,
    // so single-field banners do not decide the delimiter.
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Score: lines sharing the most common multi-field count, times that count
        let Some(target) = counts.iter().copied().filter(|&c| c > 1).max() else {
            continue;
        };
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source: std::io::Error| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Write one row per partially filled (ticket, discipline), sorted by discipline then key.
pub fn write_missing<W: Write>(result: &ReconResult, writer: W) -> Result<(), IoError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(MISSING_HEADERS)?;

    for (discipline, detail) in sorted_missing(result) {
        let value = |kind: EstimateKind| detail.values.get(&kind).map(|v| v.to_string()).unwrap_or_default();
        wtr.write_record([
            discipline.to_string(),
            detail.ticket_key.clone(),
            detail.assignee.clone(),
            join_kinds(&detail.missing_fields),
            join_kinds(&detail.present_fields),
            value(EstimateKind::Original),
            value(EstimateKind::Ai),
            value(EstimateKind::Actual),
        ])?;
    }

    wtr.flush().map_err(|e| IoError::Csv(e.into()))?;
    Ok(())
}

pub fn export_missing(result: &ReconResult, path: &Path) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write_missing(result, file)
}
