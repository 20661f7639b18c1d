//! Option reconstruction and answer reconciliation for a question table.
//!
//! Each row runs through a fixed sequence: [`explode`] the option blob,
//! [`resplit`](explode::resplit) it when it still looks concatenated,
//! [`regroup`] word-per-line fragments, and finally [`reconcile`] the
//! recorded answers against the resulting options. The pipeline is total:
//! malformed cells yield empty lists rather than errors.

pub mod classify;
pub mod explode;
pub mod normalize;
pub mod reconcile;
pub mod regroup;

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::RepairConfig;
use crate::model::{CellValue, QuestionRow, QuestionTable};

pub use classify::{is_phrase, mostly_phrases};
pub use explode::{Explosion, explode};
pub use normalize::{normalize, split_answers};
pub use reconcile::{Reconciliation, reconcile};
pub use regroup::{Regrouped, regroup};

/// Separator used when corrected answers are written back.
pub const ANSWER_SEPARATOR: &str = "; ";

/// Per-run counters describing what the pipeline touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub rows: usize,
    pub options_rewritten: usize,
    pub rows_split: usize,
    pub rows_resplit: usize,
    pub rows_regrouped: usize,
    pub answers_changed: usize,
    pub options_added: usize,
    pub columns_added: Vec<String>,
}

/// What happened to a single row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowOutcome {
    pub split: bool,
    pub resplit: bool,
    pub collapsed: usize,
    pub answer_changed: bool,
    pub options_added: usize,
}

/// An answer that does not match any option of its row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedAnswer {
    /// Zero-based position of the row in the table.
    pub index: usize,
    pub id: String,
    pub answer: String,
}

/// Repairs every row of `table`, returning the corrected copy.
pub fn process(table: &QuestionTable, config: &RepairConfig) -> QuestionTable {
    process_with_report(table, config).0
}

/// Same as [`process`] but also returns the run counters.
#[instrument(level = "info", skip_all, fields(rows = table.rows.len()))]
pub fn process_with_report(
    table: &QuestionTable,
    config: &RepairConfig,
) -> (QuestionTable, RepairReport) {
    let mut repaired = table.clone();
    let mut report = RepairReport {
        rows: repaired.rows.len(),
        ..RepairReport::default()
    };

    for counter in [&config.columns.times_attempted, &config.columns.errors] {
        if repaired.ensure_column(counter) {
            report.columns_added.push(counter.clone());
        }
    }
    let fill_attempts = report.columns_added.contains(&config.columns.times_attempted);
    let fill_errors = report.columns_added.contains(&config.columns.errors);

    for row in &mut repaired.rows {
        if fill_attempts {
            row.times_attempted = CellValue::Number(0.0);
        }
        if fill_errors {
            row.errors = CellValue::Number(0.0);
        }

        let before = row.options.clone();
        let outcome = process_row(row, config);
        if row.options != before {
            report.options_rewritten += 1;
        }
        report.rows_split += usize::from(outcome.split);
        report.rows_resplit += usize::from(outcome.resplit);
        report.rows_regrouped += usize::from(outcome.collapsed > 0);
        report.answers_changed += usize::from(outcome.answer_changed);
        report.options_added += outcome.options_added;
    }

    info!(
        rewritten = report.options_rewritten,
        answers_changed = report.answers_changed,
        options_added = report.options_added,
        "question table repaired"
    );
    (repaired, report)
}

/// Runs the pipeline over one row, rewriting its options and, when an answer
/// was corrected, its answer blob.
pub fn process_row(row: &mut QuestionRow, config: &RepairConfig) -> RowOutcome {
    let row_id = row.id.as_text();
    let answers = split_answers(&row.answers);

    let exploded = explode(&row.options, &answers, &config.explode);
    let mut lines = exploded.lines;

    let forced = config.explode.override_for(row.numeric_id());
    let resplit = explode::needs_resplit(&lines, &answers, forced.is_some(), &config.explode);
    if resplit {
        lines = explode::resplit(&lines, &answers, forced.is_some(), &config.explode);
        debug!(
            row = %row_id,
            lines = lines.len(),
            override_label = forced.map(|entry| entry.label.as_str()),
            "forced resplit of concatenated options"
        );
    }

    let regrouped = regroup(lines, &answers, &config.regroup, &config.phrase);
    if regrouped.collapsed > 0 {
        debug!(
            row = %row_id,
            collapsed = regrouped.collapsed,
            passes = regrouped.passes,
            "regrouped fragmented options"
        );
    }

    let reconciled = reconcile(regrouped.lines, &answers, &config.reconcile);
    if reconciled.answer_changed || reconciled.options_added > 0 {
        debug!(
            row = %row_id,
            answer_changed = reconciled.answer_changed,
            options_added = reconciled.options_added,
            "reconciled answers with options"
        );
    }

    row.options = reconciled.options.join("\n");
    if reconciled.answer_changed {
        row.answers = reconciled.answers.join(ANSWER_SEPARATOR);
    }

    RowOutcome {
        split: exploded.split,
        resplit,
        collapsed: regrouped.collapsed,
        answer_changed: reconciled.answer_changed,
        options_added: reconciled.options_added,
    }
}

/// Lists every answer whose normalized form is missing from its row's
/// normalized options, taking the option blob line by line.
pub fn validate(table: &QuestionTable) -> Vec<UnmatchedAnswer> {
    let mut unmatched = Vec::new();
    for (index, row) in table.rows.iter().enumerate() {
        let options: HashSet<String> = normalize::split_lines(&row.options)
            .iter()
            .map(|line| normalize(line))
            .collect();
        for answer in split_answers(&row.answers) {
            if !options.contains(&normalize(&answer)) {
                unmatched.push(UnmatchedAnswer {
                    index,
                    id: row.id.as_text(),
                    answer,
                });
            }
        }
    }
    unmatched
}
