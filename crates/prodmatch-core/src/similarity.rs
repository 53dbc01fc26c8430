//! Fuzzy string ratios on a 0–100 scale.
//!
//! The pre-filter's composite score blends three ratios from the
//! fuzzywuzzy family, all case- and token-order-insensitive when used on
//! normalized text:
//!
//! - [`token_sort_ratio`] — tokens sorted before comparison;
//! - [`token_set_ratio`] — intersection/remainder construction, robust to
//!   extra words on either side;
//! - [`partial_ratio`] — best window of the longer string against the
//!   shorter one, robust to embedded matches.
//!
//! All ratios are built on normalized Levenshtein similarity.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

/// Plain similarity ratio between two strings, in `[0.0, 100.0]`.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    normalized_levenshtein(a, b) * 100.0
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Ratio with tokens sorted alphabetically first.
///
/// `"5L RENKO CERA"` and `"CERA RENKO 5L"` compare as identical.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Ratio over the token intersection and remainders.
///
/// Builds three strings — the sorted intersection `t0`, `t0` plus the
/// tokens unique to `a`, and `t0` plus the tokens unique to `b` — and
/// returns the best pairwise ratio. A query fully contained in a longer
/// description scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection: Vec<&str> = set_a.intersection(&set_b).copied().collect();
    let only_a: Vec<&str> = set_a.difference(&set_b).copied().collect();
    let only_b: Vec<&str> = set_b.difference(&set_a).copied().collect();

    let t0 = intersection.join(" ");
    let t1 = join_nonempty(&t0, &only_a.join(" "));
    let t2 = join_nonempty(&t0, &only_b.join(" "));

    ratio(&t0, &t1).max(ratio(&t0, &t2)).max(ratio(&t1, &t2))
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{} {}", a, b),
    }
}

/// Best ratio of the shorter string against any equally-sized window of
/// the longer one.
///
/// `"CERA 5L"` inside `"CERA LIQUIDA PREMIUM 5L"` scores high even though
/// the full-string ratio is mediocre.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let chars_a: Vec<char> = a.chars().collect();
    let chars_b: Vec<char> = b.chars().collect();

    let (short, long) = if chars_a.len() <= chars_b.len() {
        (chars_a, chars_b)
    } else {
        (chars_b, chars_a)
    };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }
    if short.len() == long.len() {
        let s: String = short.into_iter().collect();
        let l: String = long.into_iter().collect();
        return ratio(&s, &l);
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0f64;

    for start in 0..=(long.len() - short.len()) {
        let window: String = long[start..start + short.len()].iter().collect();
        let r = ratio(&needle, &window);
        if r > best {
            best = r;
            if best >= 100.0 {
                break;
            }
        }
    }

    best
}
