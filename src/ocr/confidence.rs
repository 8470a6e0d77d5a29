//! Deterministic quality heuristic for extracted text.
//!
//! The score is a rule-based signal, not a statistical probability. The
//! constants are a compatibility contract with records produced by earlier
//! deployments and must not be tuned.

/// Score extracted text on a 0..=100 scale.
///
/// Rules, applied in order and clamped at the end:
/// - start at 100
/// - −20 when the text is shorter than 50 characters
/// - −30 when the ratio of non-alphanumeric, non-whitespace characters
///   exceeds 0.3 (OCR noise signal)
/// - −5 per run of 4+ identical consecutive characters (each run once)
/// - +10 when sentence-terminating punctuation is present
pub fn score(text: &str) -> u8 {
    let mut score: i32 = 100;

    let total = text.chars().count();
    if total < 50 {
        score -= 20;
    }

    if total > 0 {
        let noisy = text
            .chars()
            .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
            .count();
        if noisy as f64 / total as f64 > 0.3 {
            score -= 30;
        }
    }

    score -= 5 * repeated_runs(text) as i32;

    if text.contains(['.', '!', '?']) {
        score += 10;
    }

    score.clamp(0, 100) as u8
}

/// Count runs of 4 or more identical consecutive characters.
fn repeated_runs(text: &str) -> usize {
    let mut runs = 0;
    let mut current: Option<char> = None;
    let mut length = 0;

    for c in text.chars() {
        if Some(c) == current {
            length += 1;
        } else {
            if length >= 4 {
                runs += 1;
            }
            current = Some(c);
            length = 1;
        }
    }
    if length >= 4 {
        runs += 1;
    }

    runs
}
