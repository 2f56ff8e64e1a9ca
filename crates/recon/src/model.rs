use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::config::TotalsMode;
use crate::error::ReconError;

/// Assignee reported for tickets whose export row has none.
pub const UNASSIGNED: &str = "Unassigned";

/// Text tokens spreadsheet exports use for "no value". Matched after trimming.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A raw cell value as delivered by the loader.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Collapse the loader's spellings of "nothing here" into `None`.
    ///
    /// A recorded zero stays present; only blank text, NA tokens and NaN
    /// count as absent.
    pub fn normalized(self) -> Option<Cell> {
        match self {
            Cell::Number(n) if n.is_nan() => None,
            Cell::Number(n) => Some(Cell::Number(n)),
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
                    None
                } else {
                    Some(Cell::Text(s))
                }
            }
        }
    }

    /// Finite numeric reading of the cell, parsing text if needed.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    pub fn raw(&self) -> String {
        match self {
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// One exported work item.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRow {
    pub key: String,
    pub assignee: Option<String>,
    pub cells: HashMap<String, Cell>,
}

impl TicketRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            assignee: None,
            cells: HashMap::new(),
        }
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_cell(mut self, column: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.cells.insert(column.into(), cell.into());
        self
    }

    pub fn cell(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn assignee_or_default(&self) -> &str {
        match self.assignee.as_deref() {
            Some(a) if !a.trim().is_empty() => a,
            _ => UNASSIGNED,
        }
    }
}

/// Read-only snapshot of a sprint export: ordered rows with unique keys.
#[derive(Debug, Clone)]
pub struct TicketTable {
    columns: Vec<String>,
    rows: Vec<TicketRow>,
    index: HashMap<String, usize>,
}

impl TicketTable {
    /// Build a table, normalizing absent cells and enforcing unique, non-blank keys.
    ///
    /// Columns that only appear in row cells are appended to `columns` in sorted
    /// order, so a header-less construction still resolves.
    pub fn new(columns: Vec<String>, rows: Vec<TicketRow>) -> Result<Self, ReconError> {
        let mut columns = columns;
        let mut index = HashMap::with_capacity(rows.len());
        let mut normalized = Vec::with_capacity(rows.len());

        for (row_idx, row) in rows.into_iter().enumerate() {
            let key = row.key.trim().to_string();
            if key.is_empty() {
                return Err(ReconError::BlankKey { row: row_idx });
            }
            if index.contains_key(&key) {
                return Err(ReconError::DuplicateKey { key });
            }

            let cells: HashMap<String, Cell> = row
                .cells
                .into_iter()
                .filter_map(|(col, cell)| cell.normalized().map(|c| (col, c)))
                .collect();
            let assignee = row
                .assignee
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty());

            index.insert(key.clone(), row_idx);
            normalized.push(TicketRow { key, assignee, cells });
        }

        let mut extra: BTreeSet<&String> = BTreeSet::new();
        for row in &normalized {
            for col in row.cells.keys() {
                if !columns.contains(col) {
                    extra.insert(col);
                }
            }
        }
        let extra: Vec<String> = extra.into_iter().cloned().collect();
        columns.extend(extra);

        Ok(Self {
            columns,
            rows: normalized,
            index,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn rows(&self) -> &[TicketRow] {
        &self.rows
    }

    pub fn get(&self, key: &str) -> Option<&TicketRow> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The three numeric signals tracked per discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateKind {
    Original,
    Ai,
    Actual,
}

impl EstimateKind {
    pub const ALL: [EstimateKind; 3] = [Self::Original, Self::Ai, Self::Actual];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Original => "Original Estimate",
            Self::Ai => "AI Estimate",
            Self::Actual => "Actual Time",
        }
    }
}

impl std::fmt::Display for EstimateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    Complete,
    Partial,
    Missing,
}

impl std::fmt::Display for Completeness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Partial => write!(f, "partial"),
            Self::Missing => write!(f, "missing"),
        }
    }
}

/// Ticket keys partitioned by completeness for one discipline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    pub complete: BTreeSet<String>,
    pub partial: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

impl Buckets {
    pub fn insert(&mut self, key: String, completeness: Completeness) {
        match completeness {
            Completeness::Complete => self.complete.insert(key),
            Completeness::Partial => self.partial.insert(key),
            Completeness::Missing => self.missing.insert(key),
        };
    }

    /// Drop a key from whichever bucket holds it.
    pub fn remove(&mut self, key: &str) -> bool {
        self.complete.remove(key) || self.partial.remove(key) || self.missing.remove(key)
    }

    pub fn bucket_of(&self, key: &str) -> Option<Completeness> {
        if self.complete.contains(key) {
            Some(Completeness::Complete)
        } else if self.partial.contains(key) {
            Some(Completeness::Partial)
        } else if self.missing.contains(key) {
            Some(Completeness::Missing)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.complete.len() + self.partial.len() + self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Aggregation + deviation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub original: f64,
    pub ai: f64,
    pub actual: f64,
}

impl Totals {
    pub fn add(&mut self, kind: EstimateKind, value: f64) {
        match kind {
            EstimateKind::Original => self.original += value,
            EstimateKind::Ai => self.ai += value,
            EstimateKind::Actual => self.actual += value,
        }
    }
}

impl std::ops::AddAssign for Totals {
    fn add_assign(&mut self, rhs: Self) {
        self.original += rhs.original;
        self.ai += rhs.ai;
        self.actual += rhs.actual;
    }
}

/// Deviation of both estimates from actual time, and how much of the
/// original estimate's error the AI estimate removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Improvement {
    pub original_vs_actual: f64,
    pub ai_vs_actual: f64,
    pub overall_improvement: f64,
}

// ---------------------------------------------------------------------------
// Per-discipline output
// ---------------------------------------------------------------------------

/// Field-level breakdown of a partially filled ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingDetail {
    pub ticket_key: String,
    pub assignee: String,
    pub missing_fields: BTreeSet<EstimateKind>,
    pub present_fields: BTreeSet<EstimateKind>,
    pub values: BTreeMap<EstimateKind, f64>,
}

/// A ticket dropped from a discipline because one of its values is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedTicket {
    pub ticket_key: String,
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisciplineResult {
    pub discipline: String,
    pub total_tickets: usize,
    pub complete_count: usize,
    pub partial_count: usize,
    pub missing_count: usize,
    pub excluded_count: usize,
    pub original_total: f64,
    pub ai_total: f64,
    pub actual_total: f64,
    pub original_vs_actual_pct: f64,
    pub ai_vs_actual_pct: f64,
    pub improvement_pct: f64,
    pub completion_rate_pct: f64,
    pub ai_vs_original_pct: f64,
    pub missing_details: Vec<MissingDetail>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<ExcludedTicket>,
}

impl DisciplineResult {
    pub fn totals(&self) -> Totals {
        Totals {
            original: self.original_total,
            ai: self.ai_total,
            actual: self.actual_total,
        }
    }
}

/// A discipline left out of the run under the skip policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDiscipline {
    pub discipline: String,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallSummary {
    pub total_unique_tickets: usize,
    pub total_complete: usize,
    pub total_partial: usize,
    pub total_missing: usize,
    pub total_excluded: usize,
    pub original_total: f64,
    pub ai_total: f64,
    pub actual_total: f64,
    pub completion_rate_pct: f64,
    pub ai_vs_original_pct: f64,
    pub original_vs_actual_pct: f64,
    pub ai_vs_actual_pct: f64,
    pub improvement_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconMeta {
    pub schema_name: String,
    pub engine_version: String,
    pub totals_mode: TotalsMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: OverallSummary,
    pub disciplines: Vec<DisciplineResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedDiscipline>,
}

impl ReconResult {
    pub fn discipline(&self, name: &str) -> Option<&DisciplineResult> {
        self.disciplines.iter().find(|d| d.discipline == name)
    }

    pub fn has_complete_data(&self) -> bool {
        self.disciplines.iter().any(|d| d.complete_count > 0)
    }
}
