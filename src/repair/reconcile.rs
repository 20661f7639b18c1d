use std::collections::HashSet;

use crate::config::ReconcileSettings;
use crate::repair::normalize::{ANSWER_DELIMITER, loose_key, normalize, split_lines};

/// Options and answers after alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub options: Vec<String>,
    pub answers: Vec<String>,
    pub answer_changed: bool,
    pub options_added: usize,
}

/// Aligns every answer with an option.
///
/// An answer with no normalized match is rewritten to the longest option
/// that contains it or is contained by it. Options holding the answer
/// delimiter are never chosen, since the rewritten cell would split them
/// apart again. With no candidate the answer is appended as a new option,
/// flattened onto a single line. Options are never removed.
pub fn reconcile(
    mut options: Vec<String>,
    answers: &[String],
    settings: &ReconcileSettings,
) -> Reconciliation {
    let mut known: HashSet<String> = options.iter().map(|option| normalize(option)).collect();
    let mut corrected = answers.to_vec();
    let mut answer_changed = false;
    let mut options_added = 0;

    for (index, answer) in answers.iter().enumerate() {
        let normalized = normalize(answer);
        if known.contains(&normalized) {
            continue;
        }

        let key = containment_key(answer, settings);
        let best = options
            .iter()
            .filter(|option| !option.contains(ANSWER_DELIMITER))
            .filter(|option| overlaps(&key, &containment_key(option, settings)))
            .reduce(|best, option| {
                if option.chars().count() > best.chars().count() {
                    option
                } else {
                    best
                }
            });

        match best {
            Some(option) => {
                corrected[index] = option.clone();
                answer_changed = true;
            }
            None => {
                let flat = split_lines(answer).join(" ");
                if flat != *answer {
                    corrected[index] = flat.clone();
                    answer_changed = true;
                }
                if !options.contains(&flat) {
                    options.push(flat);
                    known.insert(normalized);
                    options_added += 1;
                }
            }
        }
    }

    if answer_changed {
        let mut seen = HashSet::new();
        corrected.retain(|answer| seen.insert(answer.clone()));
    }

    Reconciliation {
        options,
        answers: corrected,
        answer_changed,
        options_added,
    }
}

fn containment_key(text: &str, settings: &ReconcileSettings) -> String {
    if settings.loose_containment {
        loose_key(text)
    } else {
        normalize(text)
    }
}

fn overlaps(answer: &str, option: &str) -> bool {
    !answer.is_empty() && !option.is_empty() && (answer.contains(option) || option.contains(answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn drifted_answer_takes_the_option_text() {
        let result = reconcile(
            strings(&["Align strategy and execution"]),
            &strings(&["align strategy & execution."]),
            &ReconcileSettings::default(),
        );
        assert!(result.answer_changed);
        assert_eq!(result.answers, strings(&["Align strategy and execution"]));
        assert_eq!(result.options_added, 0);
    }

    #[test]
    fn strict_containment_does_not_read_ampersands() {
        let settings = ReconcileSettings {
            loose_containment: false,
        };
        let result = reconcile(
            strings(&["Align strategy and execution"]),
            &strings(&["align strategy & execution."]),
            &settings,
        );
        assert!(!result.answer_changed);
        assert_eq!(result.options_added, 1);
    }

    #[test]
    fn missing_answer_is_appended() {
        let result = reconcile(
            strings(&["A", "B", "C"]),
            &strings(&["D"]),
            &ReconcileSettings::default(),
        );
        assert_eq!(result.options, strings(&["A", "B", "C", "D"]));
        assert_eq!(result.options_added, 1);
        assert_eq!(result.answers, strings(&["D"]));
        assert!(!result.answer_changed);
    }

    #[test]
    fn longest_overlapping_option_wins() {
        let result = reconcile(
            strings(&["Lean", "Lean portfolio management", "Agile teams"]),
            &strings(&["Lean portfolio"]),
            &ReconcileSettings::default(),
        );
        assert_eq!(result.answers, strings(&["Lean portfolio management"]));
    }

    #[test]
    fn repeated_missing_answers_are_appended_once() {
        let result = reconcile(
            strings(&["Alpha"]),
            &strings(&["Omega", "omega."]),
            &ReconcileSettings::default(),
        );
        assert_eq!(result.options, strings(&["Alpha", "Omega"]));
        assert_eq!(result.options_added, 1);
    }

    #[test]
    fn empty_options_receive_every_answer() {
        let result = reconcile(Vec::new(), &strings(&["Yes", "No"]), &ReconcileSettings::default());
        assert_eq!(result.options, strings(&["Yes", "No"]));
        assert_eq!(result.options_added, 2);
    }

    #[test]
    fn options_holding_the_delimiter_are_not_chosen() {
        let result = reconcile(
            strings(&["Plan; do; check", "Wait"]),
            &strings(&["Plan", "do", "check"]),
            &ReconcileSettings::default(),
        );
        assert!(!result.answer_changed);
        assert_eq!(
            result.options,
            strings(&["Plan; do; check", "Wait", "Plan", "do", "check"])
        );
        assert_eq!(result.answers, strings(&["Plan", "do", "check"]));
    }

    #[test]
    fn corrected_answers_are_not_repeated() {
        let result = reconcile(
            strings(&["Lean portfolio management", "Agile teams"]),
            &strings(&["Lean portfolio", "portfolio management"]),
            &ReconcileSettings::default(),
        );
        assert!(result.answer_changed);
        assert_eq!(result.answers, strings(&["Lean portfolio management"]));
    }

    #[test]
    fn multi_line_answers_are_appended_on_one_line() {
        let result = reconcile(
            strings(&["X", "Y"]),
            &strings(&["Foo\nBar"]),
            &ReconcileSettings::default(),
        );
        assert_eq!(result.options, strings(&["X", "Y", "Foo Bar"]));
        assert_eq!(result.answers, strings(&["Foo Bar"]));
        assert!(result.answer_changed);
        assert_eq!(result.options_added, 1);
    }

    #[test]
    fn punctuation_only_options_never_match() {
        let result = reconcile(
            strings(&["--", "Beta"]),
            &strings(&["Gamma"]),
            &ReconcileSettings::default(),
        );
        assert_eq!(result.options, strings(&["--", "Beta", "Gamma"]));
    }
}
