// sprintlens CLI - sprint estimation analysis over Jira-style exports

mod analyze;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use sprintlens_io::IoError;
use sprintlens_recon::config::{BadValuePolicy, MissingColumnPolicy};
use sprintlens_recon::{ReconError, TotalsMode};

use exit_codes::{io_exit_code, recon_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "sprintlens")]
#[command(about = "Compare original, AI-assisted and actual sprint estimates per discipline")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a ticket export and write the report workbook
    #[command(after_help = "\
Examples:
  sprintlens analyze                               # newest .xlsx in ./input
  sprintlens analyze sprint-42.xlsx --no-report --json
  sprintlens analyze export.csv --skip-rows 0 --config team.toml
  sprintlens analyze --totals all-present --on-bad-value exclude-ticket
  sprintlens analyze sprint.xlsx --missing-csv gaps.csv --output result.json")]
    Analyze {
        /// Ticket export (.xlsx, .xls, .ods, .csv). Defaults to the newest .xlsx in --input-dir
        input: Option<PathBuf>,

        /// Discipline schema and policy (.toml). Defaults to the stock five-discipline schema
        #[arg(long, short = 'c', env = "SPRINTLENS_CONFIG")]
        config: Option<PathBuf>,

        /// Directory searched when no INPUT is given
        #[arg(long, default_value = "input")]
        input_dir: PathBuf,

        /// Directory the timestamped report workbook is written to
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Print the result as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Write the result JSON to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write partial tickets as CSV
        #[arg(long, value_name = "FILE")]
        missing_csv: Option<PathBuf>,

        /// Skip writing the report workbook
        #[arg(long)]
        no_report: bool,

        /// Banner rows above the header row (overrides config)
        #[arg(long)]
        skip_rows: Option<usize>,

        /// Which tickets feed the totals (overrides config)
        #[arg(long, value_enum)]
        totals: Option<TotalsArg>,

        /// Malformed estimate values: abort the run or exclude the ticket (overrides config)
        #[arg(long, value_enum)]
        on_bad_value: Option<BadValueArg>,

        /// Mapped columns missing from the export: abort or skip the discipline (overrides config)
        #[arg(long, value_enum)]
        on_missing_column: Option<MissingColumnArg>,
    },

    /// Check a config, and optionally that an export carries every mapped column
    #[command(after_help = "\
Examples:
  sprintlens validate --config team.toml
  sprintlens validate --config team.toml sprint-42.xlsx")]
    Validate {
        /// Config to check. Defaults to the stock schema
        #[arg(long, short = 'c', env = "SPRINTLENS_CONFIG")]
        config: Option<PathBuf>,

        /// Export whose header row is checked against the schema
        input: Option<PathBuf>,
    },

    /// Print the effective config as TOML
    #[command(after_help = "\
Examples:
  sprintlens schema > team.toml
  sprintlens schema --config team.toml")]
    Schema {
        #[arg(long, short = 'c', env = "SPRINTLENS_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TotalsArg {
    CompleteOnly,
    AllPresent,
}

impl From<TotalsArg> for TotalsMode {
    fn from(arg: TotalsArg) -> Self {
        match arg {
            TotalsArg::CompleteOnly => TotalsMode::CompleteOnly,
            TotalsArg::AllPresent => TotalsMode::AllPresent,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BadValueArg {
    Abort,
    ExcludeTicket,
}

impl From<BadValueArg> for BadValuePolicy {
    fn from(arg: BadValueArg) -> Self {
        match arg {
            BadValueArg::Abort => BadValuePolicy::Abort,
            BadValueArg::ExcludeTicket => BadValuePolicy::ExcludeTicket,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MissingColumnArg {
    Abort,
    SkipDiscipline,
}

impl From<MissingColumnArg> for MissingColumnPolicy {
    fn from(arg: MissingColumnArg) -> Self {
        match arg {
            MissingColumnArg::Abort => MissingColumnPolicy::Abort,
            MissingColumnArg::SkipDiscipline => MissingColumnPolicy::SkipDiscipline,
        }
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  sprintlens-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  sprintlens-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            input,
            config,
            input_dir,
            output_dir,
            json,
            output,
            missing_csv,
            no_report,
            skip_rows,
            totals,
            on_bad_value,
            on_missing_column,
        } => analyze::cmd_analyze(analyze::AnalyzeArgs {
            input,
            config,
            input_dir,
            output_dir,
            json,
            output,
            missing_csv,
            no_report,
            skip_rows,
            totals: totals.map(Into::into),
            on_bad_value: on_bad_value.map(Into::into),
            on_missing_column: on_missing_column.map(Into::into),
        }),
        Commands::Validate { config, input } => analyze::cmd_validate(config, input),
        Commands::Schema { config } => analyze::cmd_schema(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingColumn { .. } => {
                Some("check the column names with `sprintlens schema`, or pass --on-missing-column skip-discipline")
            }
            ReconError::DataFormat { .. } => Some("fix the value, or pass --on-bad-value exclude-ticket"),
            ReconError::DuplicateKey { .. } => Some("each ticket key may appear only once per export"),
            _ => None,
        };
        let cli = CliError::new(recon_exit_code(&err), err.to_string());
        match hint {
            Some(h) => cli.with_hint(h),
            None => cli,
        }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Recon(e) => e.into(),
            IoError::MissingHeader { .. } => {
                CliError::new(io_exit_code(&err), err.to_string()).with_hint("adjust --skip-rows or input.skip_rows")
            }
            other => CliError::new(io_exit_code(&other), other.to_string()),
        }
    }
}
