//! `depval` — deposit validation against a reference activity ledger.

mod exit_codes;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use depval_engine::report::write_csv;
use depval_engine::{
    CsvFileSource, EngineError, SessionState, ValidationConfig, ValidationReport,
    ValidationSession,
};

use exit_codes::{engine_exit_code, EXIT_MAPPING_REQUIRED, EXIT_USAGE};

#[derive(Parser)]
#[command(
    name = "depval",
    version,
    about = "Validate uploaded deposits against a reference activity ledger"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a validation from a TOML config file
    #[command(after_help = "\
Examples:
  depval run depval.toml
  depval run depval.toml --json
  depval run depval.toml --csv result.csv --show-duplicates")]
    Run {
        /// Path to the validation config file
        config: PathBuf,

        /// Output the full report as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the output table as delimited text
        #[arg(long)]
        csv: Option<PathBuf>,

        /// List flagged duplicate rows on stderr
        #[arg(long)]
        show_duplicates: bool,
    },

    /// Parse and validate a config file without running
    #[command(after_help = "\
Examples:
  depval validate depval.toml")]
    Validate {
        /// Path to the validation config file
        config: PathBuf,
    },
}

struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(code: u8, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), hint: None }
    }

    fn from_engine(err: &EngineError) -> Self {
        Self::new(engine_exit_code(err), err.to_string())
    }
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { config, json, output, csv, show_duplicates } => {
            cmd_run(config, json, output, csv, show_duplicates)
        }
        Commands::Validate { config } => cmd_validate(config),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e.message);
        if let Some(hint) = e.hint {
            eprintln!("hint: {hint}");
        }
        std::process::exit(e.code as i32);
    }
}

fn load_config(config_path: &Path) -> Result<ValidationConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| CliError::new(EXIT_USAGE, format!("cannot read config: {e}")))?;
    ValidationConfig::from_toml(&config_str).map_err(|e| CliError::from_engine(&e))
}

fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    csv_file: Option<PathBuf>,
    show_duplicates: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Resolve data paths relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let upload_path = base_dir.join(&config.upload);
    let upload_csv = std::fs::read_to_string(&upload_path).map_err(|e| {
        CliError::new(EXIT_USAGE, format!("cannot read {}: {e}", upload_path.display()))
    })?;

    let source = CsvFileSource::new(base_dir.join(&config.reference));
    let output_config = config.output.clone();

    let mut session = ValidationSession::new(config);
    session.load_upload(&upload_csv);

    if let SessionState::AwaitingMapping { missing } = session.state() {
        let mut err = CliError::new(
            EXIT_MAPPING_REQUIRED,
            format!("column mapping required for: {}", missing.join(", ")),
        );
        err.hint = Some(
            "add a [mapping] table to the config, e.g. \"client id\" = \"customer number\""
                .into(),
        );
        return Err(err);
    }

    let report = session
        .process(&source)
        .map_err(|e| CliError::from_engine(&e))?;

    // JSON report: --output flag wins over the config's output.json path
    let json_str = serde_json::to_string_pretty(report)
        .map_err(|e| CliError::new(EXIT_USAGE, format!("JSON serialization error: {e}")))?;

    let json_path = output_file.or_else(|| output_config.json.as_ref().map(PathBuf::from));
    if let Some(path) = json_path {
        std::fs::write(&path, &json_str).map_err(|e| {
            CliError::new(EXIT_USAGE, format!("cannot write {}: {e}", path.display()))
        })?;
        eprintln!("wrote {}", path.display());
    }

    let csv_path = csv_file.or_else(|| output_config.csv.as_ref().map(PathBuf::from));
    if let Some(path) = csv_path {
        let file = std::fs::File::create(&path).map_err(|e| {
            CliError::new(EXIT_USAGE, format!("cannot write {}: {e}", path.display()))
        })?;
        write_csv(&report.rows, file).map_err(|e| CliError::from_engine(&e))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(report, show_duplicates);
    Ok(())
}

/// Human summary to stderr — stdout stays clean for --json.
fn print_summary(report: &ValidationReport, show_duplicates: bool) {
    let s = &report.summary;
    eprintln!(
        "{}: {} rows x {} cols — {} duplicate pair(s)",
        report.meta.config_name, s.shape.rows, s.shape.cols, s.duplicate_pairs,
    );

    let counts: Vec<String> = s
        .status_counts
        .iter()
        .map(|(status, n)| format!("{n} {status}"))
        .collect();
    eprintln!("status: {}", counts.join(", "));

    if show_duplicates && !report.duplicates.groups.is_empty() {
        eprintln!("duplicates:");
        for group in &report.duplicates.groups {
            for row in &group.rows {
                let tag = &report.duplicates.tags[row];
                eprintln!(
                    "  row {} client {} {} — {tag}",
                    row + 1,
                    group.client_id,
                    group.date,
                );
            }
        }
    }
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "config ok: '{}' (cooldown {} days, {} mapping override(s))",
        config.name,
        config.cooldown_days,
        config.mapping.len(),
    );
    Ok(())
}
