//! `sprintlens analyze`, `validate` and `schema`.

use std::path::{Path, PathBuf};

use log::{info, warn};
use sprintlens_io::{
    ensure_directory, find_latest_input, human_summary, load_ticket_table, timestamped_report_name,
    write_json, write_missing_csv, write_workbook,
};
use sprintlens_recon::config::{BadValuePolicy, MissingColumnPolicy};
use sprintlens_recon::{ReconConfig, TotalsMode};

use crate::exit_codes::EXIT_INVALID_CONFIG;
use crate::CliError;

pub const NO_COMPLETE_DATA: &str = "no complete data points found for any discipline";

pub struct AnalyzeArgs {
    pub input: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub missing_csv: Option<PathBuf>,
    pub no_report: bool,
    pub skip_rows: Option<usize>,
    pub totals: Option<TotalsMode>,
    pub on_bad_value: Option<BadValuePolicy>,
    pub on_missing_column: Option<MissingColumnPolicy>,
}

/// Read a config file, or fall back to the stock schema.
fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    let config = ReconConfig::from_toml(&text)?;
    info!("config '{}' with {} discipline(s)", config.name, config.schema.len());
    Ok(config)
}

fn resolve_input(input: Option<PathBuf>, input_dir: &Path) -> Result<PathBuf, CliError> {
    match input {
        Some(path) => Ok(path),
        None => find_latest_input(input_dir).map_err(|e| {
            CliError::from(e).with_hint(format!(
                "place a ticket export in {}/ or pass its path",
                input_dir.display()
            ))
        }),
    }
}

pub fn cmd_analyze(args: AnalyzeArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(skip) = args.skip_rows {
        config.input.skip_rows = skip;
    }
    if let Some(totals) = args.totals {
        config.policy.totals = totals;
    }
    if let Some(policy) = args.on_bad_value {
        config.policy.on_bad_value = policy;
    }
    if let Some(policy) = args.on_missing_column {
        config.policy.on_missing_column = policy;
    }

    let input = resolve_input(args.input, &args.input_dir)?;
    eprintln!("reading {}", input.display());
    let table = load_ticket_table(&input, &config.input)?;

    let result = sprintlens_recon::run(&config, &table)?;

    if let Some(ref path) = args.output {
        write_json(&result, path)?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = args.missing_csv {
        write_missing_csv(&result, path)?;
        eprintln!("wrote {}", path.display());
    }

    if !args.no_report {
        ensure_directory(&args.output_dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = args.output_dir.join(timestamped_report_name(&stamp));
        write_workbook(&result, &table, &path)?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    eprintln!("{}", human_summary(&result));

    if !result.has_complete_data() {
        warn!("{NO_COMPLETE_DATA}");
        eprintln!("warning: {NO_COMPLETE_DATA}");
    }

    Ok(())
}

pub fn cmd_validate(config_path: Option<PathBuf>, input: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    config.validate()?;

    if let Some(input) = input {
        let table = load_ticket_table(&input, &config.input)?;
        let problems: Vec<String> = config
            .schema
            .iter()
            .filter_map(|mapping| mapping.resolve(&table).err())
            .map(|e| e.to_string())
            .collect();
        if !problems.is_empty() {
            return Err(CliError::new(EXIT_INVALID_CONFIG, problems.join("\n       "))
                .with_hint("column names must match the export header exactly"));
        }
        eprintln!(
            "{}: {} ticket(s), all {} discipline(s) resolved",
            input.display(),
            table.len(),
            config.schema.len()
        );
    }

    eprintln!("config OK: '{}' with {} discipline(s)", config.name, config.schema.len());
    Ok(())
}

pub fn cmd_schema(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    print!("{}", config.to_toml()?);
    Ok(())
}
