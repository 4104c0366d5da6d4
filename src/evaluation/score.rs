//! Score extraction from free-form judge text.

use std::sync::OnceLock;

use regex::Regex;

/// Rendered prefix of a failed verdict.
pub const JUDGE_FAILURE_PREFIX: &str = "Error:";

/// Highest score on the judging scale.
pub const MAX_SCORE: u8 = 5;

fn digit_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(/\s*)?([0-9]+)").expect("digit run pattern is valid"))
}

/// Extracts the 0..=5 score from judge output.
///
/// ASCII digit runs are scanned left to right. A run preceded by `/` is a
/// denominator and ignored. The first remaining run that is a single digit
/// in range wins; anything else (multi-digit, out of range) is skipped and
/// never clamped. Returns `None` for empty text, text without a valid score
/// and rendered judge failures.
pub fn extract_score(text: &str) -> Option<u8> {
    let text = text.trim_start();
    if text.is_empty() || text.starts_with(JUDGE_FAILURE_PREFIX) {
        return None;
    }

    digit_run_regex()
        .captures_iter(text)
        .filter(|caps| caps.get(1).is_none())
        .filter_map(|caps| caps.get(2))
        .map(|run| run.as_str())
        .filter(|run| run.len() == 1)
        .filter_map(|run| run.parse::<u8>().ok())
        .find(|&score| score <= MAX_SCORE)
}
