use std::collections::HashSet;

use crate::config::{PhraseThresholds, RegroupSettings};
use crate::repair::classify::mostly_phrases;
use crate::repair::normalize::normalize;

/// Outcome of stitching fragments back together.
#[derive(Debug, Clone, PartialEq)]
pub struct Regrouped {
    pub lines: Vec<String>,
    /// Number of passes over the answer list that were run.
    pub passes: usize,
    /// Number of windows collapsed into a single line.
    pub collapsed: usize,
}

impl Regrouped {
    fn unchanged(lines: Vec<String>) -> Self {
        Self {
            lines,
            passes: 0,
            collapsed: 0,
        }
    }
}

/// Rebuilds options that were entered one word per line by merging
/// contiguous windows of lines that spell out an expected answer.
///
/// Lines are left untouched when every answer already matches, or when most
/// lines are full phrases. Each pass walks the answers in order and
/// collapses the leftmost, then smallest, matching window for each answer
/// still missing. Passes repeat until nothing collapses, capped at the
/// number of distinct answers.
pub fn regroup(
    lines: Vec<String>,
    answers: &[String],
    window: &RegroupSettings,
    thresholds: &PhraseThresholds,
) -> Regrouped {
    if lines.is_empty() {
        return Regrouped::unchanged(lines);
    }

    let mut targets: Vec<String> = Vec::new();
    for answer in answers {
        let key = normalize(answer);
        if !targets.contains(&key) {
            targets.push(key);
        }
    }

    if all_present(&lines, &targets) || mostly_phrases(&lines, thresholds) {
        return Regrouped::unchanged(lines);
    }

    let mut lines = lines;
    let mut passes = 0;
    let mut collapsed = 0;

    while passes < targets.len() {
        passes += 1;
        let mut changed = false;

        for target in &targets {
            if lines.iter().any(|line| normalize(line) == *target) {
                continue;
            }
            if let Some((start, end, joined)) = find_window(&lines, target, window) {
                lines[start] = joined;
                lines.drain(start + 1..end);
                collapsed += 1;
                changed = true;
            }
        }

        if !changed || lines.is_empty() {
            break;
        }
    }

    Regrouped {
        lines,
        passes,
        collapsed,
    }
}

fn all_present(lines: &[String], targets: &[String]) -> bool {
    let present: HashSet<String> = lines.iter().map(|line| normalize(line)).collect();
    targets.iter().all(|target| present.contains(target))
}

/// Finds the first window (leftmost start, then smallest length) whose
/// joined text normalizes to `target`.
fn find_window(
    lines: &[String],
    target: &str,
    window: &RegroupSettings,
) -> Option<(usize, usize, String)> {
    let min = window.min_window.max(2);
    for start in 0..lines.len() {
        for len in min..=window.max_window {
            let end = start + len;
            if end > lines.len() {
                break;
            }
            let joined = join_window(&lines[start..end]);
            if normalize(&joined) == target {
                return Some((start, end, joined));
            }
        }
    }
    None
}

/// Joins a window with single spaces and tightens hyphen spacing.
fn join_window(window: &[String]) -> String {
    window.join(" ").replace(" - ", "-").replace("- ", "-")
}
