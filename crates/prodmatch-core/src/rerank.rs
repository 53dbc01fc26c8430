//! AI re-ranking and classification capability.
//!
//! Providers share one semantic contract: given a query and a bounded
//! candidate list, return per-candidate scores with confidence and
//! justification, plus a catalog-wide "no good match, suggest a new
//! registration" signal. A second single-shot method classifies free-form
//! prompts into strict JSON (used for group/unit selection).
//!
//! Failures at this boundary are values, not panics: transport and parse
//! errors come back as [`AiFailure`] and every caller degrades to the
//! deterministic pre-filter path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Candidate, Confidence};

/// Soft failure from an AI provider. Never propagated to end callers;
/// the orchestrator and analyzer fall back to deterministic behavior.
#[derive(Debug, Error)]
pub enum AiFailure {
    /// Network, timeout, or non-success HTTP status.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Response body did not match the strict JSON contract.
    #[error("unparseable provider response: {0}")]
    Parse(String),
}

/// Per-candidate verdict from the re-ranking stage.
///
/// Wire shape: `{"codigo", "score", "confianca", "justificativa",
/// "match_exato"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAnalysis {
    #[serde(rename = "codigo")]
    pub code: String,
    pub score: i64,
    #[serde(rename = "confianca")]
    pub confidence: Confidence,
    #[serde(rename = "justificativa", default)]
    pub justification: String,
    #[serde(rename = "match_exato", default)]
    pub exact_match: bool,
}

/// Full re-ranking response: the per-candidate analyses plus the
/// batch-level registration suggestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reranking {
    #[serde(rename = "analise", default)]
    pub analyses: Vec<AiAnalysis>,
    #[serde(rename = "sugestao_cadastro", default)]
    pub suggest_registration: bool,
}

/// Interchangeable AI capability.
///
/// Selected once at construction time (a configuration choice), not per
/// call. Implementations live in the application crate; the core only
/// consumes the contract.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Provider tag for metrics and diagnostics (`"openai"`, …).
    fn name(&self) -> &str;

    /// Re-score a candidate list against the query.
    ///
    /// The candidate list is bounded by the orchestrator (the pre-filter
    /// budget); implementations may cap it further for token economy.
    async fn rerank(
        &self,
        query: &str,
        candidates: &[Candidate],
        context: Option<&str>,
    ) -> Result<Reranking, AiFailure>;

    /// Single-shot JSON classification for an arbitrary prompt.
    ///
    /// Used for group and unit selection; the returned value must be a
    /// JSON object per the prompt's instructions.
    async fn classify(&self, prompt: &str) -> Result<serde_json::Value, AiFailure>;
}
