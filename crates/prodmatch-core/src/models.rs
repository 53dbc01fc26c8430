//! Core data models for the matching and decision pipeline.
//!
//! Rust field names are English; the serde renames pin every type to the
//! Portuguese wire vocabulary of the ERP integration, so JSON produced
//! here stays drop-in compatible with the downstream automation that
//! consumes it (`acao`, `similaridade`, `sugestao_cadastro`, …).

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A catalog record as returned by the products endpoint.
///
/// Immutable snapshot data: the catalog is loaded once per process and
/// indexed by the pre-filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "id", default)]
    pub internal_id: Option<i64>,
    #[serde(rename = "grupo", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

/// How a candidate was retrieved by the pre-filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMethod {
    /// Exact catalog-code match (score 100, bypasses fuzzy scoring).
    #[serde(rename = "codigo")]
    ExactCode,
    /// Fuzzy similarity scoring.
    #[serde(rename = "fuzzy")]
    Fuzzy,
}

/// Confidence label attached by the AI re-ranking stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "ALTA")]
    High,
    #[serde(rename = "MEDIA")]
    Medium,
    #[serde(rename = "BAIXA")]
    Low,
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::Low
    }
}

/// A catalog product projected into the ranking pipeline.
///
/// `pre_score` is set by the pre-filter; the AI fields are populated only
/// when the re-ranking stage matched this candidate. `final_score` is the
/// blended score the result list is ordered by (equal to `pre_score` when
/// AI was not used).
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "id")]
    pub internal_id: Option<i64>,
    #[serde(rename = "grupo", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(rename = "score")]
    pub pre_score: i64,
    #[serde(rename = "metodo")]
    pub method: MatchMethod,
    #[serde(rename = "score_ia", skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<i64>,
    #[serde(rename = "confianca", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(rename = "justificativa", skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(rename = "match_exato", skip_serializing_if = "Option::is_none")]
    pub exact_match: Option<bool>,
    #[serde(rename = "score_final")]
    pub final_score: i64,
}

/// Per-query counters for audit and diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchMetrics {
    #[serde(rename = "candidatos_prefiltro")]
    pub prefilter_candidates: usize,
    #[serde(rename = "ia_utilizada")]
    pub ai_used: bool,
}

/// Ranked result bundle produced by the hybrid orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub query: String,
    #[serde(rename = "resultados")]
    pub results: Vec<Candidate>,
    #[serde(rename = "melhor_match")]
    pub best_match: Option<Candidate>,
    #[serde(rename = "sugestao_cadastro")]
    pub suggest_registration: bool,
    #[serde(rename = "metricas")]
    pub metrics: SearchMetrics,
}

impl SearchResult {
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            results: Vec::new(),
            best_match: None,
            suggest_registration: false,
            metrics: SearchMetrics::default(),
        }
    }
}

fn default_padrao() -> i64 {
    1
}

/// A category group from the ERP reference data.
///
/// The `identificador` carries the base category (1 = materials,
/// 2 = services, 3 = labor, 4 = farm produce).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "codigo")]
    pub code: i64,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "identificador", default)]
    pub identifier: String,
    #[serde(default = "default_padrao")]
    pub padrao: i64,
}

/// A unit of measure from the ERP reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(default = "default_padrao")]
    pub padrao: i64,
}

/// Unit reference embedded in a registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRef {
    pub id: Option<i64>,
    #[serde(rename = "codigo")]
    pub code: String,
    pub padrao: i64,
}

impl From<&Unit> for UnitRef {
    fn from(u: &Unit) -> Self {
        Self {
            id: u.id,
            code: u.code.clone(),
            padrao: u.padrao,
        }
    }
}

/// Group reference embedded in a registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: Option<i64>,
    #[serde(rename = "codigo")]
    pub code: i64,
    pub padrao: i64,
    #[serde(rename = "identificador")]
    pub identifier: String,
    #[serde(rename = "descricao")]
    pub description: String,
}

impl From<&Group> for GroupRef {
    fn from(g: &Group) -> Self {
        Self {
            id: g.id,
            code: g.code,
            padrao: g.padrao,
            identifier: g.identifier.clone(),
            description: g.description.clone(),
        }
    }
}

/// NCM (tax classification) reference, by id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NcmRef {
    pub id: i64,
}

/// Payload for creating a catalog record.
///
/// Field names mirror the ERP creation endpoint exactly; the struct
/// serializes straight into the request body. Everything except the
/// description, supplier code, unit, and group is a fixed default the
/// integration always sends (stock control on, serial/lot control off,
/// purchased item of fiscal definition 07).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationData {
    pub padrao: i64,
    pub descricao: String,
    #[serde(rename = "descricaoNFe")]
    pub descricao_nfe: String,
    pub alternativo: String,
    pub definicao_item: String,
    pub procedencia: String,
    pub definicao_fiscal: String,
    pub controla_estoque: bool,
    pub controla_serie: bool,
    pub controla_lotes: bool,
    pub controla_data_validade: bool,
    pub quantidade_calculo_validade: i64,
    pub inativo: bool,
    pub comissionado: bool,
    pub gera_solicitacao: i64,
    pub quantidade_comprar: String,
    pub definicao_icms: String,
    pub generico: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidade: Option<UnitRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grupo: Option<GroupRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ncm: Option<NcmRef>,
}

impl RegistrationData {
    /// Build a registration payload for a new catalog record.
    ///
    /// When no supplier code is available, the mandatory `alternativo`
    /// field is generated from the current Unix timestamp.
    pub fn new(
        description: &str,
        supplier_code: Option<&str>,
        unit: Option<UnitRef>,
        group: Option<GroupRef>,
    ) -> Self {
        let canonical = description.trim().to_uppercase();
        let alternativo = match supplier_code {
            Some(code) if !code.trim().is_empty() => code.trim().to_string(),
            _ => format!("AUTO-{}", Utc::now().timestamp()),
        };

        Self {
            padrao: 1,
            descricao: canonical.clone(),
            descricao_nfe: canonical,
            alternativo,
            definicao_item: "IS".to_string(),
            procedencia: "C".to_string(),
            definicao_fiscal: "07".to_string(),
            controla_estoque: true,
            controla_serie: false,
            controla_lotes: false,
            controla_data_validade: false,
            quantidade_calculo_validade: 0,
            inativo: false,
            comissionado: true,
            gera_solicitacao: 3,
            quantidade_comprar: "1".to_string(),
            definicao_icms: "N".to_string(),
            generico: "N".to_string(),
            unidade: unit,
            grupo: group,
            ncm: None,
        }
    }
}

/// Action the caller must execute for an analyzed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequiredAction {
    /// A confident match exists; link the supplier item to it.
    #[serde(rename = "apenas_vinculo")]
    LinkOnly,
    /// No confident match; create a catalog record, then link.
    #[serde(rename = "cadastro_e_vinculo")]
    RegisterAndLink,
    /// Nothing to do (already linked, or the analysis failed).
    #[serde(rename = "nenhuma")]
    None,
}

impl Default for RequiredAction {
    fn default() -> Self {
        RequiredAction::None
    }
}

/// Full decision record for one analyzed description.
///
/// Built per query, mutated through the decision pipeline, then handed to
/// the caller as-is. `product_match` holds either the scored winning
/// [`Candidate`] or, after a successful auto-registration, the raw created
/// catalog record — the same duality the wire format always had.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    #[serde(rename = "descricao_buscada")]
    pub description: String,
    #[serde(rename = "codigo_fornecedor")]
    pub supplier_code: Option<String>,
    #[serde(rename = "produto_encontrado")]
    pub product_found: bool,
    #[serde(rename = "similaridade")]
    pub similarity: i64,
    #[serde(rename = "confianca")]
    pub confidence: Confidence,
    #[serde(rename = "produto_match")]
    pub product_match: Option<serde_json::Value>,
    #[serde(rename = "acao")]
    pub action: RequiredAction,
    #[serde(rename = "dados_cadastro")]
    pub registration: Option<RegistrationData>,
    #[serde(rename = "justificativa")]
    pub justification: String,
    #[serde(rename = "cadastro_realizado")]
    pub registered: bool,
    #[serde(rename = "vinculo_realizado")]
    pub linked: bool,
    #[serde(rename = "erro")]
    pub error: Option<String>,
}

impl AnalysisOutcome {
    pub fn new(description: &str, supplier_code: Option<&str>) -> Self {
        Self {
            description: description.to_string(),
            supplier_code: supplier_code.map(str::to_string),
            product_found: false,
            similarity: 0,
            confidence: Confidence::Low,
            product_match: None,
            action: RequiredAction::None,
            registration: None,
            justification: String::new(),
            registered: false,
            linked: false,
            error: None,
        }
    }

    /// Pretty-printed JSON rendering of the outcome.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// One item of a batch analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "codigo_fornecedor", default)]
    pub supplier_code: Option<String>,
}

/// Aggregate counts for a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    #[serde(rename = "apenas_vinculo")]
    pub link_only: usize,
    #[serde(rename = "cadastro_e_vinculo")]
    pub register_and_link: usize,
    #[serde(rename = "erros")]
    pub errors: usize,
}

/// Batch analysis result: summary plus per-item outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    #[serde(rename = "resumo")]
    pub summary: BatchSummary,
    #[serde(rename = "itens")]
    pub items: Vec<AnalysisOutcome>,
}
