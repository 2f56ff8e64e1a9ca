use thiserror::Error;

/// Coarse error taxonomy callers branch on when applying a run policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The schema does not fit the ticket table (or is malformed itself).
    Configuration,
    /// A ticket carries a value the engine cannot use.
    DataFormat,
}

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Schema validation error (duplicate discipline, repeated column, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// A discipline mapping names a column the ticket table does not have.
    #[error("discipline '{discipline}': missing column '{column}'")]
    MissingColumn { discipline: String, column: String },
    /// A present value cannot be read as a finite number.
    #[error("ticket '{ticket_key}', column '{column}': cannot parse number '{value}'")]
    DataFormat {
        ticket_key: String,
        column: String,
        value: String,
    },
    /// Row handed to the table without a usable key.
    #[error("row {row}: blank ticket key")]
    BlankKey { row: usize },
    #[error("duplicate ticket key '{key}'")]
    DuplicateKey { key: String },
}

impl ReconError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigParse(_) | Self::ConfigValidation(_) | Self::MissingColumn { .. } => {
                ErrorKind::Configuration
            }
            Self::DataFormat { .. } | Self::BlankKey { .. } | Self::DuplicateKey { .. } => {
                ErrorKind::DataFormat
            }
        }
    }
}
