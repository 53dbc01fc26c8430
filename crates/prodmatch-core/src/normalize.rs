//! Text normalization shared by the type classifier and the pre-filter.
//!
//! Catalog descriptions and queries are compared in a canonical form:
//! upper-cased, punctuation replaced by spaces, whitespace collapsed.

/// Normalize a description for comparison.
///
/// Upper-cases the input, replaces every character that is not
/// alphanumeric (or `_`) with a space, collapses whitespace runs, and
/// trims. Accented characters are preserved, so `"Luva nitrílica, tam. M"`
/// becomes `"LUVA NITRÍLICA TAM M"`.
pub fn normalize(text: &str) -> String {
    let mut upper = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            upper.extend(ch.to_uppercase());
        } else {
            upper.push(' ');
        }
    }
    upper.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Query tokens eligible for substring expansion: longer than 2 chars.
pub fn expansion_tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .collect()
}
