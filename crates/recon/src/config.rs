use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{EstimateKind, TicketTable};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub policy: RunPolicy,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default, rename = "disciplines")]
    pub schema: DisciplineSchema,
}

fn default_name() -> String {
    "Sprint estimation analysis".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            policy: RunPolicy::default(),
            input: InputConfig::default(),
            schema: DisciplineSchema::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunPolicy {
    pub on_missing_column: MissingColumnPolicy,
    pub on_bad_value: BadValuePolicy,
    pub totals: TotalsMode,
}

/// What to do when a mapping names a column the export lacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingColumnPolicy {
    #[default]
    Abort,
    SkipDiscipline,
}

/// What to do when a present value is not a finite number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadValuePolicy {
    #[default]
    Abort,
    ExcludeTicket,
}

/// Which tickets feed the per-discipline totals.
///
/// `CompleteOnly` credits only tickets with all three values, so one-sided
/// data cannot skew the comparison. `AllPresent` sums every present value
/// regardless of completeness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsMode {
    #[default]
    CompleteOnly,
    AllPresent,
}

impl std::fmt::Display for TotalsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CompleteOnly => write!(f, "complete_only"),
            Self::AllPresent => write!(f, "all_present"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input layout
// ---------------------------------------------------------------------------

/// Where the ticket rows live inside an export file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// Banner rows above the header row.
    pub skip_rows: usize,
    pub key_column: String,
    pub assignee_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            skip_rows: 3,
            key_column: "Key".into(),
            assignee_column: "Assignee".into(),
            sheet: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Discipline schema
// ---------------------------------------------------------------------------

/// Columns holding one discipline's original, AI and actual figures.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DisciplineMapping {
    pub name: String,
    pub original: String,
    pub ai: String,
    pub actual: String,
}

impl DisciplineMapping {
    pub fn new(
        name: impl Into<String>,
        original: impl Into<String>,
        ai: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            original: original.into(),
            ai: ai.into(),
            actual: actual.into(),
        }
    }

    /// Mapping following the Jira export's column naming.
    pub fn stock(name: &str, column_prefix: &str) -> Self {
        Self::new(
            name,
            format!("{column_prefix} Original Estimate based on old way"),
            format!("{column_prefix} Revised Estimate based on AI"),
            format!("{column_prefix} Actual Time based on AI"),
        )
    }

    pub fn column(&self, kind: EstimateKind) -> &str {
        match kind {
            EstimateKind::Original => &self.original,
            EstimateKind::Ai => &self.ai,
            EstimateKind::Actual => &self.actual,
        }
    }

    pub fn columns(&self) -> [(EstimateKind, &str); 3] {
        EstimateKind::ALL.map(|kind| (kind, self.column(kind)))
    }

    /// Check every mapped column exists in the table.
    pub fn resolve(&self, table: &TicketTable) -> Result<(), ReconError> {
        for (_, column) in self.columns() {
            if !table.has_column(column) {
                return Err(ReconError::MissingColumn {
                    discipline: self.name.clone(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Ordered list of disciplines to reconcile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DisciplineSchema {
    pub disciplines: Vec<DisciplineMapping>,
}

impl Default for DisciplineSchema {
    fn default() -> Self {
        Self {
            disciplines: vec![
                DisciplineMapping::stock("QA", "QA"),
                DisciplineMapping::stock("TA", "TA"),
                DisciplineMapping::stock("FE", "FE Dev"),
                DisciplineMapping::stock("BE", "BE Dev"),
                DisciplineMapping::stock("BA", "BA"),
            ],
        }
    }
}

impl DisciplineSchema {
    pub fn new(disciplines: Vec<DisciplineMapping>) -> Self {
        Self { disciplines }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DisciplineMapping> {
        self.disciplines.iter()
    }

    pub fn get(&self, name: &str) -> Option<&DisciplineMapping> {
        self.disciplines.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.disciplines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disciplines.is_empty()
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let mut seen = HashSet::new();
        for mapping in &self.disciplines {
            if mapping.name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "discipline name must not be empty".into(),
                ));
            }
            if !seen.insert(mapping.name.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "duplicate discipline '{}'",
                    mapping.name
                )));
            }
            for (kind, column) in mapping.columns() {
                if column.trim().is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "discipline '{}': {} column must not be empty",
                        mapping.name,
                        kind.label()
                    )));
                }
            }
            if mapping.original == mapping.ai
                || mapping.original == mapping.actual
                || mapping.ai == mapping.actual
            {
                return Err(ReconError::ConfigValidation(format!(
                    "discipline '{}': original, ai and actual columns must be distinct",
                    mapping.name
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.input.key_column.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "input.key_column must not be empty".into(),
            ));
        }
        self.schema.validate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TicketRow;

    const TWO_DISCIPLINES: &str = r#"
name = "Sprint 42"

[policy]
on_bad_value = "exclude_ticket"

[input]
skip_rows = 0
sheet = "Export"

[[disciplines]]
name = "QA"
original = "QA Original"
ai = "QA AI"
actual = "QA Actual"

[[disciplines]]
name = "BE"
original = "BE Original"
ai = "BE AI"
actual = "BE Actual"
"#;

    #[test]
    fn parse_valid_config() {
        let config = ReconConfig::from_toml(TWO_DISCIPLINES).unwrap();
        assert_eq!(config.name, "Sprint 42");
        assert_eq!(config.schema.len(), 2);
        assert_eq!(config.schema.disciplines[1].name, "BE");
        assert_eq!(config.policy.on_bad_value, BadValuePolicy::ExcludeTicket);
        assert_eq!(config.policy.on_missing_column, MissingColumnPolicy::Abort);
        assert_eq!(config.policy.totals, TotalsMode::CompleteOnly);
        assert_eq!(config.input.skip_rows, 0);
        assert_eq!(config.input.key_column, "Key");
        assert_eq!(config.input.sheet.as_deref(), Some("Export"));
    }

    #[test]
    fn empty_config_uses_stock_schema() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config, ReconConfig::default());
        let names: Vec<&str> = config.schema.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["QA", "TA", "FE", "BE", "BA"]);
        assert_eq!(
            config.schema.get("FE").unwrap().original,
            "FE Dev Original Estimate based on old way"
        );
        assert_eq!(config.input.skip_rows, 3);
    }

    #[test]
    fn explicit_empty_schema_is_allowed() {
        let config = ReconConfig::from_toml("disciplines = []").unwrap();
        assert!(config.schema.is_empty());
    }

    #[test]
    fn reject_duplicate_discipline() {
        let input = r#"
[[disciplines]]
name = "QA"
original = "a"
ai = "b"
actual = "c"

[[disciplines]]
name = "QA"
original = "d"
ai = "e"
actual = "f"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("duplicate discipline 'QA'"));
    }

    #[test]
    fn reject_repeated_column() {
        let input = r#"
[[disciplines]]
name = "QA"
original = "a"
ai = "a"
actual = "c"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("must be distinct"));
    }

    #[test]
    fn reject_unknown_policy_value() {
        let err = ReconConfig::from_toml("[policy]\ntotals = \"everything\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn toml_round_trip_keeps_schema() {
        let config = ReconConfig::from_toml(TWO_DISCIPLINES).unwrap();
        let text = config.to_toml().unwrap();
        assert_eq!(ReconConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn resolve_reports_first_missing_column() {
        let table = TicketTable::new(
            vec!["Key".into(), "QA Original".into(), "QA AI".into()],
            vec![TicketRow::new("T-1")],
        )
        .unwrap();
        let mapping = DisciplineMapping::new("QA", "QA Original", "QA AI", "QA Actual");
        let err = mapping.resolve(&table).unwrap_err();
        assert!(matches!(
            err,
            ReconError::MissingColumn { ref discipline, ref column }
                if discipline == "QA" && column == "QA Actual"
        ));
    }
}
