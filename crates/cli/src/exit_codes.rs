//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                        |
//! |------|----------------------------------------------------------------|
//! | 0    | Success (including runs with no complete data points)          |
//! | 1    | General error (unspecified)                                    |
//! | 2    | CLI usage error (bad args)                                     |
//! | 3    | Invalid config or schema/export mismatch                       |
//! | 4    | Malformed ticket data                                          |
//! | 5    | Input/output failure (missing file, unreadable workbook, write) |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the mapping functions below

use sprintlens_io::IoError;
use sprintlens_recon::{ErrorKind, ReconError};

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// Emitted by clap before any command runs.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

/// Config failed to parse or validate, or a mapping names a column the export lacks.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// A ticket value could not be used (malformed number, blank or duplicate key).
pub const EXIT_DATA_FORMAT: u8 = 4;

/// Input missing or unreadable, or a report could not be written.
pub const EXIT_IO: u8 = 5;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err.kind() {
        ErrorKind::Configuration => EXIT_INVALID_CONFIG,
        ErrorKind::DataFormat => EXIT_DATA_FORMAT,
    }
}

/// Map a loader/writer error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Recon(e) => recon_exit_code(e),
        IoError::MissingHeader { .. } | IoError::MissingKeyColumn(_) => EXIT_INVALID_CONFIG,
        IoError::Json(_) => EXIT_ERROR,
        IoError::Read { .. }
        | IoError::Write { .. }
        | IoError::NoInputFile(_)
        | IoError::UnsupportedFormat(_)
        | IoError::Workbook(_)
        | IoError::Csv(_)
        | IoError::Xlsx(_) => EXIT_IO,
    }
}
