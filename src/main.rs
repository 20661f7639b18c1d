use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use quizfix::io::excel_read;
use quizfix::materialize::{self, BackupStatus, CleanOptions, Materialized};
use quizfix::{RepairConfig, RepairError, Result, repair};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| RepairError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Clean(args) => execute_clean(args),
        Command::Check(args) => execute_check(args),
    }
}

fn execute_clean(args: CleanArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let options = CleanOptions {
        output: args.output,
        backup: !args.no_backup,
        force: args.force,
    };

    let outcome = materialize::ensure_clean(&args.input, &options, &config)?;
    match &outcome {
        Materialized::UpToDate { .. } => {}
        Materialized::Regenerated { backup, .. } => report_backup(backup),
        Materialized::Unsaved { backup, error, .. } => {
            report_backup(backup);
            eprintln!("warning: cleaned workbook not saved: {error}");
        }
    }
    println!("{}", outcome.output().display());
    Ok(())
}

fn execute_check(args: CheckArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(RepairError::MissingInput(args.input));
    }
    let config = load_config(args.config.as_deref())?;
    let table = excel_read::read_table(&args.input, &config.columns)?;

    let before = repair::validate(&table);
    let (repaired, report) = repair::process_with_report(&table, &config);
    let after = repair::validate(&repaired);

    if args.json {
        let summary = serde_json::json!({
            "report": report,
            "unmatched_before": before,
            "unmatched_after": after,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("rows: {}", report.rows);
    println!("unmatched answers before repair: {}", before.len());
    for entry in &before {
        println!("  row {} (#{}): {}", entry.index + 2, entry.id, entry.answer);
    }
    println!(
        "options rewritten: {}, answers corrected: {}, options added: {}",
        report.options_rewritten, report.answers_changed, report.options_added
    );
    println!("unmatched answers after repair: {}", after.len());
    for entry in &after {
        println!("  row {} (#{}): {}", entry.index + 2, entry.id, entry.answer);
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RepairConfig> {
    match path {
        Some(path) => RepairConfig::from_path(path),
        None => Ok(RepairConfig::default()),
    }
}

fn report_backup(backup: &BackupStatus) {
    if let BackupStatus::Failed { path, reason } = backup {
        eprintln!("warning: backup {} not written: {reason}", path.display());
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Repair option and answer cells of a multiple-choice question workbook."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a cleaned copy of the workbook, reusing it while it is current.
    Clean(CleanArgs),
    /// Report answers that do not match any option, before and after repair.
    Check(CheckArgs),
}

#[derive(clap::Args)]
struct CleanArgs {
    /// Source workbook.
    #[arg(long)]
    input: PathBuf,

    /// Cleaned workbook path. Defaults to `<stem>_CLEAN.<ext>`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Optional JSON configuration overriding thresholds and column names.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not copy the source to `<stem>_backup.<ext>`.
    #[arg(long)]
    no_backup: bool,

    /// Regenerate even when the cleaned workbook is newer than the source.
    #[arg(long)]
    force: bool,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Source workbook.
    #[arg(long)]
    input: PathBuf,

    /// Optional JSON configuration overriding thresholds and column names.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the findings as JSON.
    #[arg(long)]
    json: bool,
}
