// File I/O for sprint exports: loading ticket tables and writing reports

pub mod csv;
pub mod error;
pub mod input;
pub mod json;
pub mod report;
pub mod table;
pub mod xlsx;

pub use crate::csv::export_missing as write_missing_csv;
pub use error::IoError;
pub use input::{ensure_directory, find_latest_input, load_ticket_table, timestamped_report_name};
pub use json::export as write_json;
pub use report::human_summary;
pub use xlsx::export as write_workbook;
