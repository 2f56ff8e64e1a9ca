// JSON export of reconciliation results

use std::path::Path;

use sprintlens_recon::model::ReconResult;

use crate::error::IoError;

pub fn to_string(result: &ReconResult) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn export(result: &ReconResult, path: &Path) -> Result<(), IoError> {
    let json = to_string(result)?;
    std::fs::write(path, json).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}
