use crate::config::PhraseThresholds;

/// Judges whether a line reads as a complete phrase rather than a short
/// token fragment. Any single criterion suffices.
pub fn is_phrase(line: &str, thresholds: &PhraseThresholds) -> bool {
    let text = line.trim();
    if text.is_empty() {
        return false;
    }
    text.chars().count() >= thresholds.min_chars
        || text.split_whitespace().count() >= thresholds.min_words
        || text.ends_with(['.', '!', '?'])
}

/// Returns `true` when at least `ceil(majority * len)` of the lines are
/// phrases, with a floor of one. Empty lists never qualify.
pub fn mostly_phrases<S: AsRef<str>>(lines: &[S], thresholds: &PhraseThresholds) -> bool {
    if lines.is_empty() {
        return false;
    }
    let phrases = lines
        .iter()
        .filter(|line| is_phrase(line.as_ref(), thresholds))
        .count();
    let required = ((thresholds.majority * lines.len() as f64).ceil() as usize).max(1);
    phrases >= required
}
