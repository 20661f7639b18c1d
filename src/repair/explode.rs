//! Splits option cells so that every option sits on its own line.
//!
//! Splitting only ever cuts lines apart; it never merges them.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ExplodeSettings;
use crate::repair::normalize::{normalize, split_lines};

/// End of sentence followed by the likely start of another one. Group 1 is
/// the gap that gets cut.
static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?](\s+)[\p{Lu}\p{Nd}("“]"#).expect("sentence break pattern is valid")
});

/// Looser boundary used only for rows listed in the override table.
static RELAXED_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?;](\s+)[\p{L}\p{Nd}("“]"#).expect("relaxed break pattern is valid")
});

/// Result of exploding an option cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub lines: Vec<String>,
    /// Whether any line was cut apart.
    pub split: bool,
}

/// Breaks the raw option blob into candidate option lines.
///
/// A single line is cut at sentence boundaries, falling back to
/// capital-start runs. With several lines, each one is cut independently;
/// when nothing splits the original lines come back unchanged. A line that
/// already equals one of `answers` is never cut.
pub fn explode(raw: &str, answers: &[String], settings: &ExplodeSettings) -> Explosion {
    let lines = split_lines(raw);
    let keys = answer_keys(answers);

    if let [line] = lines.as_slice() {
        if keys.contains(&normalize(line)) {
            return Explosion {
                lines,
                split: false,
            };
        }
        let parts = split_at(line, &SENTENCE_BREAK);
        if parts.len() >= 2 {
            return Explosion {
                lines: parts,
                split: true,
            };
        }
        if settings.capital_split {
            if let Some(runs) = capital_runs(line, settings.capital_split_min_words) {
                return Explosion {
                    lines: runs,
                    split: true,
                };
            }
        }
        return Explosion {
            lines,
            split: false,
        };
    }

    let mut expanded = Vec::with_capacity(lines.len());
    let mut split = false;
    for line in &lines {
        let parts = if keys.contains(&normalize(line)) {
            Vec::new()
        } else {
            split_at(line, &SENTENCE_BREAK)
        };
        if parts.len() >= 2 {
            expanded.extend(parts);
            split = true;
        } else {
            expanded.push(line.clone());
        }
    }

    if split {
        Explosion {
            lines: expanded,
            split,
        }
    } else {
        Explosion { lines, split }
    }
}

/// Whether the exploded lines still look concatenated: some line exceeds
/// the long-line threshold, or the row is covered by an override and only a
/// single line is left. Lines equal to an answer are ignored.
pub fn needs_resplit(
    lines: &[String],
    answers: &[String],
    forced: bool,
    settings: &ExplodeSettings,
) -> bool {
    let keys = answer_keys(answers);
    let open = |line: &String| !keys.contains(&normalize(line));
    lines
        .iter()
        .any(|line| is_long(line, settings) && open(line))
        || (forced && lines.len() == 1 && open(&lines[0]))
}

/// Second splitting pass over lines flagged by [`needs_resplit`].
///
/// Long lines are cut again at sentence boundaries. Rows covered by an
/// override are cut at relaxed boundaries instead, and their sole remaining
/// line is treated as long. Any part that is still long is tried against
/// the capital-start fallback. Lines equal to an answer are kept whole.
pub fn resplit(
    lines: &[String],
    answers: &[String],
    forced: bool,
    settings: &ExplodeSettings,
) -> Vec<String> {
    let keys = answer_keys(answers);
    let single = forced && lines.len() == 1;
    let boundary: &Regex = if forced { &RELAXED_BREAK } else { &SENTENCE_BREAK };
    let mut result = Vec::with_capacity(lines.len());

    for line in lines {
        if (!single && !is_long(line, settings)) || keys.contains(&normalize(line)) {
            result.push(line.clone());
            continue;
        }

        let parts = split_at(line, boundary);
        let unsplit = parts.len() == 1;
        for part in parts {
            let retry_caps = is_long(&part, settings) || (single && unsplit);
            if settings.capital_split && retry_caps {
                if let Some(runs) = capital_runs(&part, settings.capital_split_min_words) {
                    result.extend(runs);
                    continue;
                }
            }
            result.push(part);
        }
    }

    result
}

fn answer_keys(answers: &[String]) -> HashSet<String> {
    answers.iter().map(|answer| normalize(answer)).collect()
}

fn is_long(line: &str, settings: &ExplodeSettings) -> bool {
    line.chars().count() > settings.long_line_chars
}

/// Cuts `line` at every gap captured by `pattern`, trimming the pieces and
/// dropping empty ones.
fn split_at(line: &str, pattern: &Regex) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    for captures in pattern.captures_iter(line) {
        if let Some(gap) = captures.get(1) {
            push_trimmed(&mut parts, &line[start..gap.start()]);
            start = gap.end();
        }
    }
    push_trimmed(&mut parts, &line[start..]);
    parts
}

fn push_trimmed(parts: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        parts.push(piece.to_string());
    }
}

/// Groups words into runs that each begin with an uppercase word. Only
/// accepted when there are at least two runs and every run has
/// `min_words` words, so short proper nouns are not torn apart.
fn capital_runs(line: &str, min_words: usize) -> Option<Vec<String>> {
    let mut runs: Vec<Vec<&str>> = Vec::new();
    for word in line.split_whitespace() {
        let capital = word.chars().next().is_some_and(char::is_uppercase);
        match runs.last_mut() {
            Some(run) if !capital => run.push(word),
            _ => runs.push(vec![word]),
        }
    }

    if runs.len() < 2 || runs.iter().any(|run| run.len() < min_words) {
        return None;
    }
    Some(runs.into_iter().map(|run| run.join(" ")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABBREVIATED: &str = "Automate the delivery pipeline with practices e.g. build, test and \
        release stages so that every change is verified quickly and reaches production with \
        minimal manual effort and risk";

    fn settings() -> ExplodeSettings {
        ExplodeSettings::default()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn run(raw: &str) -> Explosion {
        explode(raw, &[], &settings())
    }

    fn long_clause() -> String {
        format!(
            "{}; then {}",
            "Keep the solution vision short and focused on outcomes for customers".repeat(2),
            "align the roadmap with the portfolio and review it every planning interval"
        )
    }

    #[test]
    fn splits_single_line_at_sentence_boundaries() {
        let exploded = run("Define the vision. Establish a roadmap. Communicate broadly.");
        assert!(exploded.split);
        assert_eq!(
            exploded.lines,
            strings(&["Define the vision.", "Establish a roadmap.", "Communicate broadly."])
        );
    }

    #[test]
    fn sentence_starts_include_digits_quotes_and_parentheses() {
        let exploded = run("Stop. 2 teams. (Optional) sync! \"Quoted\" end?");
        assert_eq!(
            exploded.lines,
            strings(&["Stop.", "2 teams.", "(Optional) sync!", "\"Quoted\" end?"])
        );
    }

    #[test]
    fn lowercase_continuations_are_not_boundaries() {
        let exploded = run("Use e.g. tests first");
        assert!(!exploded.split);
        assert_eq!(exploded.lines, strings(&["Use e.g. tests first"]));
    }

    #[test]
    fn already_split_lines_pass_through_unchanged() {
        let raw = "Define the vision.\nEstablish a roadmap.\n\n  Communicate broadly.  ";
        let exploded = run(raw);
        assert!(!exploded.split);
        assert_eq!(
            exploded.lines,
            strings(&["Define the vision.", "Establish a roadmap.", "Communicate broadly."])
        );
    }

    #[test]
    fn splits_only_the_lines_holding_several_sentences() {
        let exploded = run("Plan it. Build it.\nShip it");
        assert!(exploded.split);
        assert_eq!(exploded.lines, strings(&["Plan it.", "Build it.", "Ship it"]));
    }

    #[test]
    fn lines_equal_to_an_answer_are_never_split() {
        let answers = strings(&["Do this. Then that."]);
        let exploded = explode("Alpha one.\nBeta two.\nDo this. Then that.", &answers, &settings());
        assert!(!exploded.split);
        assert_eq!(
            exploded.lines,
            strings(&["Alpha one.", "Beta two.", "Do this. Then that."])
        );

        let exploded = explode("Do this. Then that", &answers, &settings());
        assert_eq!(exploded.lines, strings(&["Do this. Then that"]));
    }

    #[test]
    fn capital_runs_split_concatenated_phrases() {
        let exploded =
            run("Define the enterprise strategy Establish lean budgets Align strategy and execution");
        assert_eq!(
            exploded.lines,
            strings(&[
                "Define the enterprise strategy",
                "Establish lean budgets",
                "Align strategy and execution"
            ])
        );
    }

    #[test]
    fn capital_runs_leave_short_names_alone() {
        let exploded = run("Scrum Master");
        assert!(!exploded.split);
        assert_eq!(exploded.lines, strings(&["Scrum Master"]));

        let mut disabled = settings();
        disabled.capital_split = false;
        let exploded = explode("Define the strategy Establish budgets", &[], &disabled);
        assert_eq!(exploded.lines.len(), 1);
    }

    #[test]
    fn empty_cells_explode_to_nothing() {
        assert!(run("").lines.is_empty());
        assert!(run(" \n \n").lines.is_empty());
    }

    #[test]
    fn long_lines_outside_overrides_keep_abbreviations_and_clauses() {
        let lines = vec!["Short option".to_string(), ABBREVIATED.to_string(), long_clause()];
        assert!(needs_resplit(&lines, &[], false, &settings()));
        assert_eq!(resplit(&lines, &[], false, &settings()), lines);
    }

    #[test]
    fn long_lines_outside_overrides_fall_back_to_capital_runs() {
        let long = "Keep the solution vision short and focused on customer outcomes every \
            quarter Align the roadmap with the portfolio and review it at every planning \
            interval with all teams";
        let lines = vec!["Short option".to_string(), long.to_string()];
        let resplit = resplit(&lines, &[], false, &settings());
        assert_eq!(resplit.len(), 3);
        assert!(resplit[2].starts_with("Align the roadmap"));
    }

    #[test]
    fn override_rows_use_relaxed_boundaries_on_long_lines() {
        let lines = vec!["Short option".to_string(), long_clause()];
        let resplit = resplit(&lines, &[], true, &settings());
        assert_eq!(resplit.len(), 3);
        assert_eq!(resplit[0], "Short option");
        assert!(resplit[2].starts_with("then align"));
    }

    #[test]
    fn overrides_force_a_second_pass_on_single_lines() {
        let lines = strings(&["Define the vision; share it widely"]);
        assert!(!needs_resplit(&lines, &[], false, &settings()));
        assert!(needs_resplit(&lines, &[], true, &settings()));
        assert_eq!(
            resplit(&lines, &[], true, &settings()),
            strings(&["Define the vision;", "share it widely"])
        );
    }

    #[test]
    fn resplit_never_cuts_an_answer() {
        let lines = vec!["Short option".to_string(), long_clause()];
        let answers = vec![long_clause()];
        assert!(!needs_resplit(&lines, &answers, true, &settings()));
        assert_eq!(resplit(&lines, &answers, true, &settings()), lines);

        let single = strings(&["Define the vision; share it widely"]);
        let answers = strings(&["define the vision; share it widely."]);
        assert!(!needs_resplit(&single, &answers, true, &settings()));
    }

    #[test]
    fn resplit_is_stable_on_its_own_output() {
        let lines = strings(&["Define the vision; share it widely"]);
        let once = resplit(&lines, &[], true, &settings());
        let exploded = run(&once.join("\n"));
        assert_eq!(exploded.lines, once);
        assert!(!needs_resplit(&exploded.lines, &[], true, &settings()));
    }
}
