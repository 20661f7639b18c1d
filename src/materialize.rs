//! Produces the cleaned workbook next to its source and reuses it while it
//! is newer than the source.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, instrument, warn};

use crate::config::{OutputSettings, RepairConfig};
use crate::error::{RepairError, Result};
use crate::io::{excel_read, excel_write};
use crate::model::QuestionTable;
use crate::repair::{self, RepairReport};

/// Caller choices for a cleaning run.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Destination workbook; defaults to `<stem>_CLEAN.<ext>`.
    pub output: Option<PathBuf>,
    /// Copy the source once to `<stem>_backup.<ext>` before cleaning.
    pub backup: bool,
    /// Regenerate even when the output is up to date.
    pub force: bool,
}

/// Freshness of the cleaned artifact relative to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// No output file exists yet.
    Missing,
    /// The output is older than the source, or its timestamp is unreadable.
    Stale,
    /// The output is at least as new as the source.
    Fresh,
}

/// What happened to the backup copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupStatus {
    Skipped,
    AlreadyPresent(PathBuf),
    Written(PathBuf),
    /// Copying failed; cleaning continued without a backup.
    Failed { path: PathBuf, reason: String },
}

/// Result of [`ensure_clean`].
#[derive(Debug)]
pub enum Materialized {
    /// The existing output is current; nothing was read or written.
    UpToDate { output: PathBuf },
    /// The source was cleaned and the output written.
    Regenerated {
        output: PathBuf,
        table: QuestionTable,
        report: RepairReport,
        backup: BackupStatus,
    },
    /// The source was cleaned but the output could not be written. The
    /// repaired table is still usable in memory.
    Unsaved {
        output: PathBuf,
        table: QuestionTable,
        report: RepairReport,
        backup: BackupStatus,
        error: RepairError,
    },
}

impl Materialized {
    /// Path of the cleaned workbook, whether or not it was written.
    pub fn output(&self) -> &Path {
        match self {
            Materialized::UpToDate { output }
            | Materialized::Regenerated { output, .. }
            | Materialized::Unsaved { output, .. } => output,
        }
    }
}

/// Generates (or reuses, when current) the cleaned copy of `input`.
///
/// Only failing to read the source is fatal. A failed backup is recorded
/// in the outcome and a failed output write yields [`Materialized::Unsaved`].
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), force = options.force)
)]
pub fn ensure_clean(
    input: &Path,
    options: &CleanOptions,
    config: &RepairConfig,
) -> Result<Materialized> {
    if !input.exists() {
        return Err(RepairError::MissingInput(input.to_path_buf()));
    }

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| clean_path(input, &config.output));

    let staleness = staleness(input, &output)?;
    debug!(?staleness, output = %output.display(), "checked cleaned artifact");
    if staleness == Staleness::Fresh && !options.force {
        info!(output = %output.display(), "cleaned workbook is up to date");
        return Ok(Materialized::UpToDate { output });
    }

    let table = excel_read::read_table(input, &config.columns)?;
    info!(rows = table.rows.len(), "read question sheet");

    let backup = if options.backup {
        write_backup(input, &backup_path(input, &config.output))
    } else {
        BackupStatus::Skipped
    };

    let (table, report) = repair::process_with_report(&table, config);

    match excel_write::write_table(&output, &table, &config.columns) {
        Ok(()) => {
            info!(output = %output.display(), "cleaned workbook written");
            Ok(Materialized::Regenerated {
                output,
                table,
                report,
                backup,
            })
        }
        Err(error) => {
            warn!(output = %output.display(), %error, "failed to write cleaned workbook");
            Ok(Materialized::Unsaved {
                output,
                table,
                report,
                backup,
                error,
            })
        }
    }
}

/// Compares modification times of the source and the cleaned artifact.
pub fn staleness(input: &Path, output: &Path) -> Result<Staleness> {
    let source_time = fs::metadata(input)?.modified()?;

    if !output.exists() {
        return Ok(Staleness::Missing);
    }

    let output_time: Option<SystemTime> = fs::metadata(output)
        .and_then(|metadata| metadata.modified())
        .ok();
    Ok(match output_time {
        Some(time) if time >= source_time => Staleness::Fresh,
        _ => Staleness::Stale,
    })
}

/// `<stem><clean_suffix>.<ext>` next to the source.
pub fn clean_path(input: &Path, settings: &OutputSettings) -> PathBuf {
    sibling_with_suffix(input, &settings.clean_suffix)
}

/// `<stem><backup_suffix>.<ext>` next to the source.
pub fn backup_path(input: &Path, settings: &OutputSettings) -> PathBuf {
    sibling_with_suffix(input, &settings.backup_suffix)
}

fn sibling_with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(name)
}

fn write_backup(input: &Path, path: &Path) -> BackupStatus {
    if path.exists() {
        return BackupStatus::AlreadyPresent(path.to_path_buf());
    }
    match fs::copy(input, path) {
        Ok(_) => {
            debug!(backup = %path.display(), "backup written");
            BackupStatus::Written(path.to_path_buf())
        }
        Err(error) => {
            warn!(backup = %path.display(), %error, "failed to write backup");
            BackupStatus::Failed {
                path: path.to_path_buf(),
                reason: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_keep_directory_and_extension() {
        let settings = OutputSettings::default();
        let input = Path::new("/data/Preguntas_Examen.xlsx");
        assert_eq!(
            clean_path(input, &settings),
            PathBuf::from("/data/Preguntas_Examen_CLEAN.xlsx")
        );
        assert_eq!(
            backup_path(input, &settings),
            PathBuf::from("/data/Preguntas_Examen_backup.xlsx")
        );
        assert_eq!(
            clean_path(Path::new("bank"), &settings),
            PathBuf::from("bank_CLEAN")
        );
    }
}
