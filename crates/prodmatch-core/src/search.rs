//! Hybrid orchestrator: deterministic pre-filter + optional AI re-ranking.
//!
//! # Scoring flow
//!
//! 1. Pre-filter with a fixed internal budget of 20 candidates.
//! 2. If enabled and configured, re-rank via the AI capability and blend:
//!    `final = round(pre × weight_pre + ai × weight_ai)` (defaults
//!    0.3/0.7). Candidates the AI omitted keep their pre-filter score.
//!    Any AI failure degrades every candidate to its pre-filter score.
//! 3. Sort descending by final score, truncate to the requested limit.
//! 4. `best_match` is the top candidate iff its score ≥ 70;
//!    `suggest_registration` is raised on an empty candidate set, on the
//!    provider's batch signal, or when the top score falls below 50.

use std::collections::HashMap;

use crate::models::{CatalogProduct, SearchResult};
use crate::prefilter::PreFilter;
use crate::rerank::{AiAnalysis, AiProvider};

/// Internal candidate budget handed to the pre-filter, independent of the
/// caller's result limit.
pub const PREFILTER_BUDGET: usize = 20;

/// Minimum final score for a candidate to become `best_match`.
pub const MATCH_THRESHOLD: i64 = 70;

/// Below this top score, a new registration is suggested.
pub const REGISTER_THRESHOLD: i64 = 50;

const DEFAULT_WEIGHT_PRE: f64 = 0.3;
const DEFAULT_WEIGHT_AI: f64 = 0.7;

/// Two-stage matcher over a catalog snapshot.
pub struct HybridMatcher {
    prefilter: PreFilter,
    weight_pre: f64,
    weight_ai: f64,
}

impl HybridMatcher {
    /// Build a matcher with the default 0.3/0.7 blend weights.
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        Self::with_weights(products, DEFAULT_WEIGHT_PRE, DEFAULT_WEIGHT_AI)
    }

    /// Build a matcher with explicit blend weights.
    pub fn with_weights(products: Vec<CatalogProduct>, weight_pre: f64, weight_ai: f64) -> Self {
        Self {
            prefilter: PreFilter::new(products),
            weight_pre,
            weight_ai,
        }
    }

    /// Number of catalog entries behind this matcher.
    pub fn catalog_len(&self) -> usize {
        self.prefilter.len()
    }

    /// Run the hybrid search for one query.
    ///
    /// Never returns an error: AI-layer failures are absorbed and
    /// recorded in `metrics.ia_utilizada`.
    pub async fn search(
        &self,
        provider: Option<&dyn AiProvider>,
        query: &str,
        limit: usize,
        use_ai: bool,
        context: Option<&str>,
    ) -> SearchResult {
        let mut result = SearchResult::empty(query);

        let mut candidates = self.prefilter.filter(query, PREFILTER_BUDGET);
        result.metrics.prefilter_candidates = candidates.len();

        if candidates.is_empty() {
            result.suggest_registration = true;
            return result;
        }

        match provider {
            Some(ai) if use_ai => {
                match ai.rerank(query, &candidates, context).await {
                    Ok(reranking) => {
                        let by_code: HashMap<&str, &AiAnalysis> = reranking
                            .analyses
                            .iter()
                            .map(|a| (a.code.as_str(), a))
                            .collect();

                        for cand in &mut candidates {
                            match by_code.get(cand.code.as_str()) {
                                Some(analysis) => {
                                    let ai_score = analysis.score.clamp(0, 100);
                                    cand.ai_score = Some(ai_score);
                                    cand.confidence = Some(analysis.confidence);
                                    cand.justification =
                                        Some(analysis.justification.clone());
                                    cand.exact_match = Some(analysis.exact_match);
                                    cand.final_score = (cand.pre_score as f64
                                        * self.weight_pre
                                        + ai_score as f64 * self.weight_ai)
                                        .round() as i64;
                                }
                                None => cand.final_score = cand.pre_score,
                            }
                        }

                        if reranking.suggest_registration {
                            result.suggest_registration = true;
                        }
                        result.metrics.ai_used = true;
                    }
                    Err(_) => {
                        // AI unavailable: pre-filter scores stand.
                        for cand in &mut candidates {
                            cand.final_score = cand.pre_score;
                        }
                        result.metrics.ai_used = false;
                    }
                }
            }
            _ => {
                for cand in &mut candidates {
                    cand.final_score = cand.pre_score;
                }
                result.metrics.ai_used = false;
            }
        }

        // Stable sort: ties keep pre-filter order.
        candidates.sort_by(|a, b| b.final_score.cmp(&a.final_score));
        candidates.truncate(limit);

        if let Some(top) = candidates.first() {
            if top.final_score >= MATCH_THRESHOLD {
                result.best_match = Some(top.clone());
            }
            if top.final_score < REGISTER_THRESHOLD {
                result.suggest_registration = true;
            }
        }

        result.results = candidates;
        result
    }
}
