// Input discovery and format dispatch

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::info;
use sprintlens_recon::config::InputConfig;
use sprintlens_recon::model::TicketTable;

use crate::error::IoError;

/// Load a ticket export, choosing the reader by file extension.
pub fn load_ticket_table(path: &Path, input: &InputConfig) -> Result<TicketTable, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => crate::xlsx::import(path, input)?,
        "csv" | "tsv" | "txt" => crate::csv::import(path, input)?,
        other => {
            return Err(IoError::UnsupportedFormat(if other.is_empty() {
                path.display().to_string()
            } else {
                format!(".{other}")
            }))
        }
    };

    info!("loaded {} ticket(s) from {}", table.len(), path.display());
    Ok(table)
}

/// Most recently modified `.xlsx` file in `dir`. Ties break on file name.
pub fn find_latest_input(dir: &Path) -> Result<PathBuf, IoError> {
    let entries = std::fs::read_dir(dir).map_err(|source| IoError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_xlsx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        // Excel lock files (~$name.xlsx) are not exports
        let is_lock = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("~$"));
        if !is_xlsx || is_lock || !path.is_file() {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        candidates.push((modified, path));
    }

    candidates
        .into_iter()
        .max()
        .map(|(_, path)| path)
        .ok_or_else(|| IoError::NoInputFile(dir.to_path_buf()))
}

/// Create `dir` and its parents if missing.
pub fn ensure_directory(dir: &Path) -> Result<(), IoError> {
    std::fs::create_dir_all(dir).map_err(|source| IoError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

/// Report file name for a run stamped `YYYYmmdd_HHMMSS`.
pub fn timestamped_report_name(timestamp: &str) -> String {
    format!("analysis_results_{timestamp}.xlsx")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(dir: &Path, name: &str, secs: u64) {
        let file = File::create(dir.join(name)).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn latest_xlsx_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "old.xlsx", 1_000);
        touch(dir.path(), "newest.xlsx", 3_000);
        touch(dir.path(), "new.xlsx", 2_000);
        touch(dir.path(), "later.csv", 9_000);
        touch(dir.path(), "~$newest.xlsx", 9_000);

        let latest = find_latest_input(dir.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "newest.xlsx");
    }

    #[test]
    fn empty_directory_has_no_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_latest_input(dir.path()).unwrap_err();
        assert!(matches!(err, IoError::NoInputFile(_)));
        assert!(err.to_string().starts_with("no .xlsx files found in"));
    }

    #[test]
    fn ensure_directory_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("output/temp");
        assert!(!nested.exists());
        ensure_directory(&nested).unwrap();
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_ticket_table(Path::new("export.pdf"), &InputConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "unsupported input format: .pdf");
    }

    #[test]
    fn report_name_is_stamped() {
        assert_eq!(timestamped_report_name("20261019_093000"), "analysis_results_20261019_093000.xlsx");
    }
}
