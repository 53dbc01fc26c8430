//! Product-type extraction from normalized descriptions.
//!
//! A "type token" is a canonical category keyword (wax, paint, glove, …)
//! used to bucket catalog entries for fast candidate retrieval. A
//! principal term only counts as the product's type when it is not being
//! used descriptively: in `"TINTA COR GIZ DE CERA"` the word `CERA`
//! describes a paint color, so the type is `TINTA`.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Physical product categories that can anchor a type bucket.
const PRINCIPAL_TERMS: &[&str] = &[
    // limpeza
    "CERA", "SABAO", "DETERGENTE", "DESINFETANTE", "LIMPA", "LIMPADOR",
    "ALVEJANTE", "AMACIANTE", "SABONETE", "SHAMPOO", "ESPONJA", "PANO",
    "VASSOURA", "RODO", "BALDE", "ESCOVA", "LUVA", "SACO", "LIXO",
    // tintas e acabamento
    "MASSA", "TINTA", "VERNIZ", "SELADOR", "PRIMER", "FUNDO", "ESMALTE",
    "TEXTURA", "REJUNTE", "ARGAMASSA", "CIMENTO", "CAL", "GESSO",
    "COLA", "SILICONE", "VEDANTE", "IMPERMEABILIZANTE",
    // hidraulica
    "TUBO", "CANO", "CONEXAO", "REGISTRO", "TORNEIRA", "VALVULA",
    // escritorio
    "PAPEL", "CANETA", "LAPIS", "BORRACHA", "FITA", "TESOURA",
    // lubrificantes
    "OLEO", "GRAXA", "LUBRIFICANTE",
];

/// Qualifier tokens that demote a following principal term to a
/// descriptive role (color, model, product line).
const SECONDARY_PREFIXES: &[&str] = &["COR", "TIPO", "MODELO", "LINHA", "GIZ", "TONS", "TOM"];

fn principal_terms() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| PRINCIPAL_TERMS.iter().copied().collect())
}

fn secondary_prefixes() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| SECONDARY_PREFIXES.iter().copied().collect())
}

/// Extract the canonical product type from a normalized description.
///
/// Scans tokens left to right and returns the first principal term that
/// is not excluded by a secondary prefix. Two exclusion patterns apply:
///
/// - `<prefix> <term>` — e.g. `TIPO CERA` (a wax-like finish);
/// - `<prefix> DE <term>` — e.g. `GIZ DE CERA` (a crayon color name).
///
/// Returns `None` when no qualifying term is present.
pub fn product_type(normalized: &str) -> Option<&'static str> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    for (i, token) in tokens.iter().enumerate() {
        if let Some(&term) = principal_terms().get(*token) {
            if i >= 1 && secondary_prefixes().contains(tokens[i - 1]) {
                continue;
            }
            if i >= 2 && tokens[i - 1] == "DE" && secondary_prefixes().contains(tokens[i - 2]) {
                continue;
            }
            return Some(term);
        }
    }

    None
}
