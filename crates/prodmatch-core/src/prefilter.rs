//! Deterministic candidate generator over a catalog snapshot.
//!
//! The index is built once per snapshot: every description is normalized
//! and classified into a type bucket. A query then goes through three
//! retrieval paths in order — exact code, type bucket, substring
//! expansion — and the surviving candidates are scored with the fuzzy
//! composite plus a type bonus/penalty.

use std::collections::{HashMap, HashSet};

use crate::classify::product_type;
use crate::models::{Candidate, CatalogProduct, MatchMethod};
use crate::normalize::{expansion_tokens, normalize};
use crate::similarity::{partial_ratio, token_set_ratio, token_sort_ratio};

/// Candidates scoring below this are dropped, not merely ranked low.
pub const SCORE_FLOOR: i64 = 30;

/// Score bonus when the query and candidate share a product type.
const TYPE_BONUS: f64 = 30.0;
/// Score penalty when their product types differ.
const TYPE_PENALTY: f64 = 50.0;

/// Type-indexed catalog snapshot with a bounded fuzzy filter.
pub struct PreFilter {
    products: Vec<CatalogProduct>,
    normalized: Vec<String>,
    types: Vec<Option<&'static str>>,
    type_index: HashMap<&'static str, Vec<usize>>,
}

impl PreFilter {
    /// Index a catalog snapshot.
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        let normalized: Vec<String> = products
            .iter()
            .map(|p| normalize(&p.description))
            .collect();

        let types: Vec<Option<&'static str>> =
            normalized.iter().map(|n| product_type(n)).collect();

        let mut type_index: HashMap<&'static str, Vec<usize>> = HashMap::new();
        for (idx, ty) in types.iter().enumerate() {
            if let Some(t) = ty {
                type_index.entry(t).or_default().push(idx);
            }
        }

        Self {
            products,
            normalized,
            types,
            type_index,
        }
    }

    /// Number of catalog entries in the snapshot.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Produce up to `limit` scored candidates for a query.
    ///
    /// 1. Exact-code fast path: entries whose code equals the query
    ///    (case/whitespace-insensitive) return immediately with score 100
    ///    and method [`MatchMethod::ExactCode`].
    /// 2. Seed candidates from the query's type bucket.
    /// 3. Expand by substring containment over up to the first 3 query
    ///    tokens longer than 2 chars, each contributing at most `limit`
    ///    new entries, stopping once `2×limit` candidates are gathered.
    /// 4. Score, sort descending, keep the top `limit` at or above
    ///    [`SCORE_FLOOR`].
    ///
    /// Deterministic: the same query against the same snapshot always
    /// returns the same ordered list.
    pub fn filter(&self, query: &str, limit: usize) -> Vec<Candidate> {
        let code_query = query.trim().to_uppercase();

        if !code_query.is_empty() {
            let exact: Vec<usize> = (0..self.products.len())
                .filter(|&i| self.products[i].code.trim().to_uppercase() == code_query)
                .collect();
            if !exact.is_empty() {
                return exact
                    .into_iter()
                    .map(|i| self.candidate(i, 100, MatchMethod::ExactCode))
                    .collect();
            }
        }

        let query_norm = normalize(query);
        let query_type = product_type(&query_norm);

        let mut selected: Vec<usize> = Vec::new();
        let mut seen: HashSet<usize> = HashSet::new();

        if let Some(t) = query_type {
            if let Some(bucket) = self.type_index.get(t) {
                for &idx in bucket {
                    if seen.insert(idx) {
                        selected.push(idx);
                    }
                }
            }
        }

        if selected.len() < limit {
            for token in expansion_tokens(&query_norm).into_iter().take(3) {
                let mut added = 0;
                for idx in 0..self.products.len() {
                    if seen.contains(&idx) || !self.normalized[idx].contains(token) {
                        continue;
                    }
                    seen.insert(idx);
                    selected.push(idx);
                    added += 1;
                    if added >= limit {
                        break;
                    }
                }
                if selected.len() >= limit * 2 {
                    break;
                }
            }
        }

        let mut scored: Vec<(usize, i64)> = selected
            .into_iter()
            .map(|idx| (idx, self.score(&query_norm, idx, query_type)))
            .collect();

        // Stable sort: ties keep retrieval order.
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        scored
            .into_iter()
            .take(limit)
            .filter(|(_, score)| *score >= SCORE_FLOOR)
            .map(|(idx, score)| self.candidate(idx, score, MatchMethod::Fuzzy))
            .collect()
    }

    fn score(&self, query_norm: &str, idx: usize, query_type: Option<&str>) -> i64 {
        let candidate_norm = &self.normalized[idx];

        let base = token_sort_ratio(query_norm, candidate_norm) * 0.4
            + token_set_ratio(query_norm, candidate_norm) * 0.3
            + partial_ratio(query_norm, candidate_norm) * 0.3;

        let adjusted = match (query_type, self.types[idx]) {
            (Some(tq), Some(tp)) if tq == tp => base + TYPE_BONUS,
            (Some(_), Some(_)) => base - TYPE_PENALTY,
            _ => base,
        };

        adjusted.clamp(0.0, 100.0) as i64
    }

    fn candidate(&self, idx: usize, score: i64, method: MatchMethod) -> Candidate {
        let product = &self.products[idx];
        Candidate {
            code: product.code.clone(),
            description: product.description.clone(),
            internal_id: product.internal_id,
            group_id: product.group_id,
            pre_score: score,
            method,
            ai_score: None,
            confidence: None,
            justification: None,
            exact_match: None,
            final_score: score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, description: &str, id: i64) -> CatalogProduct {
        CatalogProduct {
            code: code.to_string(),
            description: description.to_string(),
            internal_id: Some(id),
            group_id: None,
        }
    }

    fn sample_catalog() -> Vec<CatalogProduct> {
        vec![
            product("001", "CERA ACRILICA RENKO 5L", 1),
            product("002", "TINTA ACRILICA COR GIZ DE CERA 18L", 2),
            product("003", "CERA LIQUIDA PREMIUM 5 LITROS", 3),
            product("004", "SABAO EM BARRA YPE 5X1", 4),
            product("005", "MASSA ACRILICA SUVINIL 18L", 5),
        ]
    }

    #[test]
    fn test_exact_code_fast_path() {
        let filter = PreFilter::new(sample_catalog());
        let results = filter.filter("001", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "001");
        assert_eq!(results[0].pre_score, 100);
        assert_eq!(results[0].method, MatchMethod::ExactCode);
    }

    #[test]
    fn test_exact_code_case_and_whitespace_insensitive() {
        let filter = PreFilter::new(vec![product("abc10", "LUVA NITRILICA M", 1)]);
        let results = filter.filter("  ABC10 ", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].method, MatchMethod::ExactCode);
    }

    #[test]
    fn test_paint_not_indexed_under_wax() {
        // The prefix-exclusion rule keeps the crayon-color paint out of
        // the CERA bucket.
        let filter = PreFilter::new(sample_catalog());
        let wax_bucket = filter.type_index.get("CERA").unwrap();
        assert!(!wax_bucket.contains(&1), "paint leaked into the CERA bucket");
        assert!(wax_bucket.contains(&0));
        assert!(wax_bucket.contains(&2));
    }

    #[test]
    fn test_wax_ranks_above_paint() {
        let filter = PreFilter::new(sample_catalog());
        let results = filter.filter("CERA ACRILICA RENKO 5L", 10);
        assert!(!results.is_empty());
        assert_eq!(results[0].code, "001");

        let wax_pos = results.iter().position(|c| c.code == "003");
        let paint_pos = results.iter().position(|c| c.code == "002");
        if let (Some(w), Some(p)) = (wax_pos, paint_pos) {
            assert!(w < p, "wax entry must outrank the paint entry");
        }
    }

    #[test]
    fn test_results_sorted_and_bounded() {
        let filter = PreFilter::new(sample_catalog());
        let results = filter.filter("CERA ACRILICA", 2);
        assert!(results.len() <= 2);
        for pair in results.windows(2) {
            assert!(pair[0].pre_score >= pair[1].pre_score);
        }
        for c in &results {
            assert!((0..=100).contains(&c.pre_score));
            assert!(c.pre_score >= SCORE_FLOOR);
        }
    }

    #[test]
    fn test_idempotent() {
        let filter = PreFilter::new(sample_catalog());
        let a = filter.filter("CERA ACRILICA RENKO 5 LITROS", 5);
        let b = filter.filter("CERA ACRILICA RENKO 5 LITROS", 5);
        let codes_a: Vec<&str> = a.iter().map(|c| c.code.as_str()).collect();
        let codes_b: Vec<&str> = b.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes_a, codes_b);
        let scores_a: Vec<i64> = a.iter().map(|c| c.pre_score).collect();
        let scores_b: Vec<i64> = b.iter().map(|c| c.pre_score).collect();
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn test_no_candidates_for_unrelated_query() {
        let filter = PreFilter::new(sample_catalog());
        let results = filter.filter("XYZWK", 10);
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_query() {
        let filter = PreFilter::new(sample_catalog());
        assert!(filter.filter("", 10).is_empty());
        assert!(filter.filter("   ", 10).is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let filter = PreFilter::new(Vec::new());
        assert!(filter.is_empty());
        assert!(filter.filter("CERA", 10).is_empty());
    }

    #[test]
    fn test_type_mismatch_penalized() {
        let filter = PreFilter::new(vec![
            product("010", "CERA LIQUIDA 5L", 1),
            product("011", "TINTA LIQUIDA 5L", 2),
        ]);
        let results = filter.filter("CERA LIQUIDA 5L", 10);
        assert_eq!(results[0].code, "010");
        assert_eq!(results[0].pre_score, 100);
        if let Some(paint) = results.iter().find(|c| c.code == "011") {
            assert!(paint.pre_score < results[0].pre_score - 40);
        }
    }
}
