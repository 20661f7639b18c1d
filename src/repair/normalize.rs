//! Comparison keys for option and answer text.
//!
//! Keys produced here are used for equality and containment tests only and
//! are never written back to the workbook.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Zero-width and non-breaking space variants removed before comparison.
const INVISIBLE: [char; 8] = [
    '\u{00A0}', '\u{2009}', '\u{2007}', '\u{202F}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}',
];

/// Separates individual answers inside a correct-answer cell.
pub const ANSWER_DELIMITER: char = ';';

/// Characters stripped from the end of a key.
const TRAILING_PUNCTUATION: [char; 5] = ['.', ';', ':', '\u{00B7}', '\u{2026}'];

/// Canonicalises `text` for case, whitespace, accent and trailing
/// punctuation insensitive comparison.
pub fn normalize(text: &str) -> String {
    let decomposed: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c) && !INVISIBLE.contains(c))
        .map(|c| if c == '\r' || c == '\t' { ' ' } else { c })
        .collect();

    let collapsed = collapse_whitespace(&decomposed).to_lowercase();
    collapsed
        .trim_end_matches(&TRAILING_PUNCTUATION[..])
        .trim_end()
        .to_string()
}

/// A looser key used for containment checks: punctuation becomes spaces and
/// `&` reads as `and`.
pub fn loose_key(text: &str) -> String {
    let normalized = normalize(text);
    let mut spaced = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        if c == '&' {
            spaced.push_str(" and ");
        } else if c.is_alphanumeric() || c.is_whitespace() {
            spaced.push(c);
        } else {
            spaced.push(' ');
        }
    }
    collapse_whitespace(&spaced)
}

/// Splits a correct-answer cell into its individual answers.
pub fn split_answers(blob: &str) -> Vec<String> {
    blob.split(ANSWER_DELIMITER)
        .map(str::trim)
        .filter(|answer| !answer.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits an option cell into trimmed, non-empty lines.
pub fn split_lines(blob: &str) -> Vec<String> {
    blob.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !collapsed.is_empty() {
            collapsed.push(' ');
        }
        collapsed.push_str(segment);
    }
    collapsed
}
