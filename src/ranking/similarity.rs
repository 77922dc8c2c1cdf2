//! String similarity metrics on a 0..=100 scale.
//!
//! All three are built on the normalized Indel similarity from `rapidfuzz`.
//! Inputs are expected to be normalized already.

use rapidfuzz::distance::indel;
use std::collections::BTreeSet;

/// Round a similarity to whole points
#[inline]
pub fn round_score(score: f64) -> f64 {
    score.round()
}

#[inline]
fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    indel::normalized_similarity(a.iter().copied(), b.iter().copied()) * 100.0
}

/// Character-level similarity of two strings
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    indel::normalized_similarity(a.chars(), b.chars()) * 100.0
}

/// Best [`ratio`] of the shorter string against any same-length window of
/// the longer one, including windows clipped at either end.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let n = short.len();
    let windows = long
        .windows(n)
        .chain((1..n).map(|i| &long[..i]))
        .chain((1..n).map(|i| &long[long.len() - i..]));

    let mut best = 0.0_f64;
    for window in windows {
        let score = ratio_chars(short, window);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

/// Word-set similarity, insensitive to token order and repetition
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    // One side is a subset of the other
    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let diff_ab = diff_ab.join(" ");
    let diff_ba = diff_ba.join(" ");
    let mut best = ratio(&diff_ab, &diff_ba);

    if !intersection.is_empty() {
        let sect = intersection.join(" ");
        let sect_ab = format!("{} {}", sect, diff_ab);
        let sect_ba = format!("{} {}", sect, diff_ba);

        best = best
            .max(ratio(&sect, &sect_ab))
            .max(ratio(&sect, &sect_ba))
            .max(ratio(&sect_ab, &sect_ba));
    }

    best
}
