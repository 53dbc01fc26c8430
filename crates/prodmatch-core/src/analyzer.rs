//! Classification decision service.
//!
//! Turns one ranked search into a structured action: link the supplier
//! item to an existing record, register a new record and link, or
//! nothing. When registration is required, the category group and unit
//! of measure are classified by the AI capability with a deterministic
//! fallback, and the registration can optionally be executed through the
//! catalog-write collaborator.
//!
//! The service is a hard error boundary: [`ProductAnalyzer::analyze`]
//! always returns a completed [`AnalysisOutcome`], never an error.

use anyhow::Result;
use tokio::sync::OnceCell;

use crate::catalog::CatalogApi;
use crate::models::{
    AnalysisOutcome, BatchItem, BatchReport, BatchSummary, Confidence, Group, GroupRef,
    RegistrationData, RequiredAction, Unit, UnitRef,
};
use crate::rerank::AiProvider;
use crate::search::HybridMatcher;

/// Auto-linking requires a stricter score than the search layer's 70%
/// match threshold: between 70 and 75 a match is reported but a new
/// registration is still created.
pub const AUTO_LINK_THRESHOLD: i64 = 75;

/// Default result limit for the decision pipeline.
const DEFAULT_DECISION_LIMIT: usize = 5;

/// Unit descriptions treated as the generic "unit" fallback.
const GENERIC_UNIT_DESCRIPTIONS: &[&str] = &["UN", "UND", "UNID", "UNIDADE"];
/// Unit codes treated as the generic "unit" fallback.
const GENERIC_UNIT_CODES: &[&str] = &["UN", "UND", "UNID"];

/// Cap on the number of groups enumerated in a classification prompt.
const GROUP_PROMPT_CAP: usize = 100;

/// Decision service over a catalog collaborator and an optional AI
/// capability.
///
/// The catalog snapshot (as a built [`HybridMatcher`]) and the
/// groups/units reference lists are materialized lazily, at most once per
/// process, and treated as immutable afterwards.
pub struct ProductAnalyzer<C: CatalogApi> {
    api: C,
    provider: Option<Box<dyn AiProvider>>,
    weight_pre: f64,
    weight_ai: f64,
    limit: usize,
    matcher: OnceCell<HybridMatcher>,
    groups: OnceCell<Vec<Group>>,
    units: OnceCell<Vec<Unit>>,
}

impl<C: CatalogApi> ProductAnalyzer<C> {
    /// Build an analyzer with the default 0.3/0.7 blend weights.
    pub fn new(api: C, provider: Option<Box<dyn AiProvider>>) -> Self {
        Self::with_weights(api, provider, 0.3, 0.7)
    }

    pub fn with_weights(
        api: C,
        provider: Option<Box<dyn AiProvider>>,
        weight_pre: f64,
        weight_ai: f64,
    ) -> Self {
        Self {
            api,
            provider,
            weight_pre,
            weight_ai,
            limit: DEFAULT_DECISION_LIMIT,
            matcher: OnceCell::new(),
            groups: OnceCell::new(),
            units: OnceCell::new(),
        }
    }

    /// Override the result limit used by the decision pipeline.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Analyze one product description.
    ///
    /// Any unexpected failure is caught here: the outcome carries the
    /// error text and `acao = nenhuma`. A failed registration write is
    /// not "unexpected" — it sets `erro` but preserves the
    /// register-and-link action so the caller can retry.
    pub async fn analyze(
        &self,
        description: &str,
        supplier_code: Option<&str>,
        context: Option<&str>,
        auto_register: bool,
    ) -> AnalysisOutcome {
        let mut outcome = AnalysisOutcome::new(description, supplier_code);

        if let Err(e) = self
            .run(&mut outcome, description, supplier_code, context, auto_register)
            .await
        {
            outcome.error = Some(e.to_string());
            outcome.action = RequiredAction::None;
        }

        outcome
    }

    /// Analyze a batch of items sequentially.
    pub async fn analyze_batch(&self, items: &[BatchItem], auto_register: bool) -> BatchReport {
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            let outcome = self
                .analyze(
                    &item.description,
                    item.supplier_code.as_deref(),
                    None,
                    auto_register,
                )
                .await;
            outcomes.push(outcome);
        }

        let summary = BatchSummary {
            total: outcomes.len(),
            link_only: outcomes
                .iter()
                .filter(|o| o.action == RequiredAction::LinkOnly)
                .count(),
            register_and_link: outcomes
                .iter()
                .filter(|o| o.action == RequiredAction::RegisterAndLink)
                .count(),
            errors: outcomes.iter().filter(|o| o.error.is_some()).count(),
        };

        BatchReport {
            summary,
            items: outcomes,
        }
    }

    async fn run(
        &self,
        outcome: &mut AnalysisOutcome,
        description: &str,
        supplier_code: Option<&str>,
        context: Option<&str>,
        auto_register: bool,
    ) -> Result<()> {
        let matcher = self.matcher().await?;
        let use_ai = self.provider.is_some();

        let search = matcher
            .search(
                self.provider.as_deref(),
                description,
                self.limit,
                use_ai,
                context,
            )
            .await;

        if let Some(best) = &search.best_match {
            outcome.product_found = true;
            outcome.similarity = best.final_score;
            outcome.confidence = best.confidence.unwrap_or(Confidence::Medium);
            outcome.product_match = Some(serde_json::to_value(best)?);
            apply_link_rule(outcome, best.final_score);
        } else if search.suggest_registration || search.results.is_empty() {
            outcome.product_found = false;
            outcome.action = RequiredAction::RegisterAndLink;
            outcome.justification = "Produto não encontrado na base de dados".to_string();
        } else if let Some(top) = search.results.first() {
            // A candidate exists but missed the 70% match threshold:
            // the same 75% split decides link vs register.
            outcome.similarity = top.final_score;
            outcome.product_match = Some(serde_json::to_value(top)?);
            apply_link_rule(outcome, top.final_score);
        }

        if outcome.action == RequiredAction::RegisterAndLink {
            let group = self.classify_group(description).await;
            let unit = self.classify_unit(description).await;
            outcome.registration = Some(RegistrationData::new(
                description,
                supplier_code,
                unit,
                group,
            ));
        }

        if auto_register && outcome.action == RequiredAction::RegisterAndLink {
            if let Some(registration) = &outcome.registration {
                match self.api.create_product(registration).await {
                    Ok(created) => {
                        outcome.registered = true;
                        outcome.product_match = Some(created);
                        outcome
                            .justification
                            .push_str(" | Cadastro realizado com sucesso");
                    }
                    Err(e) => {
                        outcome.error = Some(format!("Erro no cadastro: {e}"));
                        outcome.registered = false;
                    }
                }
            }
        }

        Ok(())
    }

    async fn matcher(&self) -> Result<&HybridMatcher> {
        self.matcher
            .get_or_try_init(|| async {
                let products = self.api.fetch_products().await?;
                Ok(HybridMatcher::with_weights(
                    products,
                    self.weight_pre,
                    self.weight_ai,
                ))
            })
            .await
    }

    async fn groups(&self) -> &[Group] {
        self.groups
            .get_or_init(|| async {
                // Missing reference data is soft: classification is
                // skipped, not failed.
                self.api.fetch_groups().await.unwrap_or_default()
            })
            .await
    }

    async fn units(&self) -> &[Unit] {
        self.units
            .get_or_init(|| async { self.api.fetch_units().await.unwrap_or_default() })
            .await
    }

    /// Pick the category group for a new record.
    ///
    /// With an AI capability and available groups, the provider chooses
    /// from the enumerated group list; an unrecognized or unparseable
    /// answer falls back to the first group. Without either, the first
    /// group is used directly.
    async fn classify_group(&self, description: &str) -> Option<GroupRef> {
        let groups = self.groups().await;
        if groups.is_empty() {
            return None;
        }

        let provider = match &self.provider {
            Some(p) => p,
            None => return default_group(groups),
        };

        let prompt = group_prompt(description, groups);
        match provider.classify(&prompt).await {
            Ok(value) => {
                let chosen = value
                    .get("codigo_grupo")
                    .and_then(|c| c.as_i64().or_else(|| c.as_str()?.parse().ok()));
                match chosen.and_then(|code| groups.iter().find(|g| g.code == code)) {
                    Some(group) => Some(GroupRef::from(group)),
                    None => default_group(groups),
                }
            }
            Err(_) => default_group(groups),
        }
    }

    /// Pick the unit of measure for a new record.
    ///
    /// Mirrors [`classify_group`], with the generic-unit fallback:
    /// a unit literally coded or described `UN`/`UND`/`UNID`/`UNIDADE`
    /// wins over the positional first unit.
    async fn classify_unit(&self, description: &str) -> Option<UnitRef> {
        let units = self.units().await;
        if units.is_empty() {
            return None;
        }

        let provider = match &self.provider {
            Some(p) => p,
            None => return default_unit(units),
        };

        let prompt = unit_prompt(description, units);
        match provider.classify(&prompt).await {
            Ok(value) => {
                let chosen = value
                    .get("codigo_unidade")
                    .and_then(|c| c.as_str())
                    .map(|c| c.trim().to_uppercase());
                match chosen.and_then(|code| {
                    units.iter().find(|u| u.code.to_uppercase() == code)
                }) {
                    Some(unit) => Some(UnitRef::from(unit)),
                    None => default_unit(units),
                }
            }
            Err(_) => default_unit(units),
        }
    }
}

fn apply_link_rule(outcome: &mut AnalysisOutcome, score: i64) {
    if score < AUTO_LINK_THRESHOLD {
        outcome.action = RequiredAction::RegisterAndLink;
        outcome.justification =
            format!("Score {score}% abaixo de {AUTO_LINK_THRESHOLD}% - cadastrando novo produto");
    } else {
        outcome.action = RequiredAction::LinkOnly;
        outcome.justification =
            format!("Match encontrado com score {score}% (≥{AUTO_LINK_THRESHOLD}%)");
    }
}

fn default_group(groups: &[Group]) -> Option<GroupRef> {
    groups.first().map(GroupRef::from)
}

fn default_unit(units: &[Unit]) -> Option<UnitRef> {
    let generic = units.iter().find(|u| {
        GENERIC_UNIT_DESCRIPTIONS.contains(&u.description.trim().to_uppercase().as_str())
            || GENERIC_UNIT_CODES.contains(&u.code.trim().to_uppercase().as_str())
    });
    generic.or_else(|| units.first()).map(UnitRef::from)
}

fn group_prompt(description: &str, groups: &[Group]) -> String {
    let listing: Vec<String> = groups
        .iter()
        .take(GROUP_PROMPT_CAP)
        .map(|g| {
            format!(
                "- Código {}: {} (ID: {}, Identificador: {})",
                g.code,
                g.description,
                g.id.map(|i| i.to_string()).unwrap_or_default(),
                g.identifier
            )
        })
        .collect();

    format!(
        r#"Analise a descrição do produto e determine qual grupo é mais adequado para classificá-lo.

DESCRIÇÃO DO PRODUTO:
"{description}"

GRUPOS DISPONÍVEIS:
{groups}

REGRAS DE CLASSIFICAÇÃO:
1. Materiais de construção (cimento, areia, tijolo, etc.) → Grupos com identificador "1" (Materiais)
2. Serviços → Grupos com identificador "2" (Serviços)
3. Mão de obra → Grupos com identificador "3" (Mão de Obra)
4. Produtos agrícolas/fazenda → Grupos com identificador "4" (Fazenda)
5. Se não souber, use o grupo mais genérico de materiais

IMPORTANTE: Analise o produto e escolha o grupo mais específico possível.

Responda APENAS em JSON com a estrutura:
{{
    "codigo_grupo": <número do código do grupo>,
    "justificativa": "<breve explicação da escolha>"
}}"#,
        description = description,
        groups = listing.join("\n")
    )
}

fn unit_prompt(description: &str, units: &[Unit]) -> String {
    let listing: Vec<String> = units
        .iter()
        .map(|u| {
            let label = if u.description.is_empty() {
                &u.code
            } else {
                &u.description
            };
            format!("- {}: {}", u.code, label)
        })
        .collect();

    format!(
        r#"Analise a descrição do produto e determine qual unidade de medida é mais adequada.

DESCRIÇÃO DO PRODUTO:
"{description}"

UNIDADES DISPONÍVEIS:
{units}

REGRAS DE CLASSIFICAÇÃO:
1. Produtos vendidos por peso (areia, brita, cimento a granel) → KG ou TON
2. Produtos em sacos (cimento, argamassa, cal) → SC (saco) ou UN
3. Produtos lineares (tubos, cabos, fios, barras) → M (metro) ou BR (barra)
4. Produtos de área (pisos, azulejos, telhas) → M2 (metro quadrado) ou UN
5. Produtos de volume (concreto, terra) → M3 (metro cúbico)
6. Líquidos (tintas, solventes, combustível) → L ou LT (litro) ou GL (galão)
7. Produtos contáveis individuais (parafusos, pregos, conexões) → UN (unidade) ou PCT/CX
8. Produtos em pares (luvas, botas) → PAR
9. Produtos em rolos (lonas, telas, fitas) → RL (rolo) ou M
10. Serviços → SV, H (hora), DIA (diária)
11. Se a descrição mencionar a unidade explicitamente, use essa
12. Na dúvida, use UN (unidade)

Responda APENAS em JSON com a estrutura:
{{
    "codigo_unidade": "<código da unidade>",
    "justificativa": "<breve explicação da escolha>"
}}"#,
        description = description,
        units = listing.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, CatalogProduct};
    use crate::rerank::{AiAnalysis, AiFailure, Reranking};
    use async_trait::async_trait;
    use serde_json::json;

    struct StubApi {
        products: Vec<CatalogProduct>,
        groups: Vec<Group>,
        units: Vec<Unit>,
        fail_products: bool,
        fail_create: bool,
    }

    impl StubApi {
        fn with_catalog(products: Vec<CatalogProduct>) -> Self {
            Self {
                products,
                groups: vec![
                    Group {
                        id: Some(1),
                        code: 101,
                        description: "MATERIAIS DIVERSOS".to_string(),
                        identifier: "1".to_string(),
                        padrao: 1,
                    },
                    Group {
                        id: Some(2),
                        code: 102,
                        description: "MATERIAL DE LIMPEZA".to_string(),
                        identifier: "1".to_string(),
                        padrao: 1,
                    },
                ],
                units: vec![
                    Unit {
                        id: Some(1),
                        code: "KG".to_string(),
                        description: "QUILOGRAMA".to_string(),
                        padrao: 1,
                    },
                    Unit {
                        id: Some(2),
                        code: "UN".to_string(),
                        description: "UNIDADE".to_string(),
                        padrao: 1,
                    },
                ],
                fail_products: false,
                fail_create: false,
            }
        }
    }

    #[async_trait]
    impl CatalogApi for StubApi {
        async fn fetch_products(&self) -> Result<Vec<CatalogProduct>> {
            if self.fail_products {
                anyhow::bail!("catalog endpoint unavailable");
            }
            Ok(self.products.clone())
        }

        async fn create_product(
            &self,
            registration: &RegistrationData,
        ) -> Result<serde_json::Value> {
            if self.fail_create {
                anyhow::bail!("HTTP 500 on create");
            }
            Ok(json!({
                "codigo": "NEW-1",
                "descricao": registration.descricao,
                "id": 999,
            }))
        }

        async fn fetch_groups(&self) -> Result<Vec<Group>> {
            Ok(self.groups.clone())
        }

        async fn fetch_units(&self) -> Result<Vec<Unit>> {
            Ok(self.units.clone())
        }
    }

    /// Provider with a fixed rerank score for every candidate and a
    /// fixed classification answer.
    struct StubProvider {
        rerank_score: i64,
        group_code: i64,
        unit_code: String,
    }

    #[async_trait]
    impl AiProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn rerank(
            &self,
            _query: &str,
            candidates: &[Candidate],
            _context: Option<&str>,
        ) -> Result<Reranking, AiFailure> {
            Ok(Reranking {
                analyses: candidates
                    .iter()
                    .map(|c| AiAnalysis {
                        code: c.code.clone(),
                        score: self.rerank_score,
                        confidence: Confidence::High,
                        justification: "avaliado".to_string(),
                        exact_match: false,
                    })
                    .collect(),
                suggest_registration: false,
            })
        }

        async fn classify(&self, prompt: &str) -> Result<serde_json::Value, AiFailure> {
            if prompt.contains("codigo_unidade") {
                Ok(json!({"codigo_unidade": self.unit_code, "justificativa": "ok"}))
            } else {
                Ok(json!({"codigo_grupo": self.group_code, "justificativa": "ok"}))
            }
        }
    }

    fn wax_catalog() -> Vec<CatalogProduct> {
        vec![CatalogProduct {
            code: "001".to_string(),
            description: "CERA ACRILICA RENKO 5L".to_string(),
            internal_id: Some(1),
            group_id: None,
        }]
    }

    #[tokio::test]
    async fn test_high_score_links_only() {
        // pre 100, ai 100 → final 100 ≥ 75.
        let analyzer = ProductAnalyzer::new(
            StubApi::with_catalog(wax_catalog()),
            Some(Box::new(StubProvider {
                rerank_score: 100,
                group_code: 102,
                unit_code: "UN".to_string(),
            })),
        );

        let outcome = analyzer
            .analyze("CERA ACRILICA RENKO 5L", None, None, false)
            .await;

        assert_eq!(outcome.action, RequiredAction::LinkOnly);
        assert!(outcome.product_found);
        assert_eq!(outcome.similarity, 100);
        assert!(outcome.registration.is_none());
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_match_between_thresholds_registers() {
        // pre 100, ai 60 → final 72: a best match exists (≥ 70) but the
        // stricter 75% auto-link rule still forces a registration.
        let analyzer = ProductAnalyzer::new(
            StubApi::with_catalog(wax_catalog()),
            Some(Box::new(StubProvider {
                rerank_score: 60,
                group_code: 102,
                unit_code: "UN".to_string(),
            })),
        );

        let outcome = analyzer
            .analyze("CERA ACRILICA RENKO 5L", Some("FORN-9"), None, false)
            .await;

        assert_eq!(outcome.action, RequiredAction::RegisterAndLink);
        assert!(outcome.product_found);
        assert_eq!(outcome.similarity, 72);
        assert!(outcome.justification.contains("abaixo de 75"));
        assert!(outcome.product_match.is_some());

        let registration = outcome.registration.expect("registration data");
        assert_eq!(registration.alternativo, "FORN-9");
        assert_eq!(registration.grupo.unwrap().code, 102);
        assert_eq!(registration.unidade.unwrap().code, "UN");
    }

    #[tokio::test]
    async fn test_sub_match_top_result_follows_same_rule() {
        // pre 100, ai 43 → final 60: below the 70% match threshold, so no
        // best match, but the top raw result still carries the decision.
        let analyzer = ProductAnalyzer::new(
            StubApi::with_catalog(wax_catalog()),
            Some(Box::new(StubProvider {
                rerank_score: 43,
                group_code: 101,
                unit_code: "KG".to_string(),
            })),
        );

        let outcome = analyzer
            .analyze("CERA ACRILICA RENKO 5L", None, None, false)
            .await;

        assert_eq!(outcome.action, RequiredAction::RegisterAndLink);
        assert!(!outcome.product_found);
        assert_eq!(outcome.similarity, 60);
        assert!(outcome.product_match.is_some());
        assert!(outcome.justification.contains("abaixo de 75"));
    }

    #[tokio::test]
    async fn test_no_candidates_suggest_registration() {
        let analyzer: ProductAnalyzer<StubApi> =
            ProductAnalyzer::new(StubApi::with_catalog(Vec::new()), None);

        let outcome = analyzer
            .analyze("PARAFUSO SEXTAVADO 3/8", None, None, false)
            .await;

        assert_eq!(outcome.action, RequiredAction::RegisterAndLink);
        assert!(!outcome.product_found);
        assert!(outcome.product_match.is_none());
        assert_eq!(
            outcome.justification,
            "Produto não encontrado na base de dados"
        );

        // Deterministic fallback classification without a provider.
        let registration = outcome.registration.expect("registration data");
        assert_eq!(registration.grupo.unwrap().code, 101);
        assert_eq!(registration.unidade.unwrap().code, "UN");
    }

    #[tokio::test]
    async fn test_catalog_failure_never_raises() {
        let mut api = StubApi::with_catalog(wax_catalog());
        api.fail_products = true;
        let analyzer: ProductAnalyzer<StubApi> = ProductAnalyzer::new(api, None);

        let outcome = analyzer.analyze("CERA ACRILICA", None, None, false).await;

        assert_eq!(outcome.action, RequiredAction::None);
        assert!(outcome.error.is_some());
        assert!(!outcome.product_found);
    }

    #[tokio::test]
    async fn test_auto_register_success_swaps_match() {
        let analyzer: ProductAnalyzer<StubApi> =
            ProductAnalyzer::new(StubApi::with_catalog(Vec::new()), None);

        let outcome = analyzer
            .analyze("LONA PLASTICA PRETA 4X100M", None, None, true)
            .await;

        assert_eq!(outcome.action, RequiredAction::RegisterAndLink);
        assert!(outcome.registered);
        assert!(outcome.justification.ends_with("Cadastro realizado com sucesso"));
        let created = outcome.product_match.expect("created record");
        assert_eq!(created["codigo"], "NEW-1");
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_auto_register_failure_preserves_action() {
        let mut api = StubApi::with_catalog(Vec::new());
        api.fail_create = true;
        let analyzer: ProductAnalyzer<StubApi> = ProductAnalyzer::new(api, None);

        let outcome = analyzer
            .analyze("LONA PLASTICA PRETA 4X100M", None, None, true)
            .await;

        assert_eq!(outcome.action, RequiredAction::RegisterAndLink);
        assert!(!outcome.registered);
        let error = outcome.error.expect("write error recorded");
        assert!(error.starts_with("Erro no cadastro:"));
    }

    #[tokio::test]
    async fn test_unit_fallback_prefers_generic_unit() {
        // The stub's unit list starts with KG; the generic UN wins.
        let units = vec![
            Unit {
                id: Some(1),
                code: "KG".to_string(),
                description: "QUILOGRAMA".to_string(),
                padrao: 1,
            },
            Unit {
                id: Some(2),
                code: "UND".to_string(),
                description: "UNIDADE".to_string(),
                padrao: 1,
            },
        ];
        let fallback = default_unit(&units).expect("unit selected");
        assert_eq!(fallback.code, "UND");

        let no_generic = vec![Unit {
            id: Some(1),
            code: "M2".to_string(),
            description: "METRO QUADRADO".to_string(),
            padrao: 1,
        }];
        assert_eq!(default_unit(&no_generic).unwrap().code, "M2");
    }

    #[tokio::test]
    async fn test_unrecognized_ai_group_falls_back() {
        let analyzer = ProductAnalyzer::new(
            StubApi::with_catalog(Vec::new()),
            Some(Box::new(StubProvider {
                rerank_score: 0,
                group_code: 999, // not in the group list
                unit_code: "XX".to_string(),
            })),
        );

        let outcome = analyzer.analyze("CIMENTO CP II 50KG", None, None, false).await;
        let registration = outcome.registration.expect("registration data");
        assert_eq!(registration.grupo.unwrap().code, 101);
        assert_eq!(registration.unidade.unwrap().code, "UN");
    }

    #[tokio::test]
    async fn test_batch_summary_counts() {
        let analyzer = ProductAnalyzer::new(
            StubApi::with_catalog(wax_catalog()),
            Some(Box::new(StubProvider {
                rerank_score: 100,
                group_code: 101,
                unit_code: "UN".to_string(),
            })),
        );

        let items = vec![
            BatchItem {
                description: "CERA ACRILICA RENKO 5L".to_string(),
                supplier_code: None,
            },
            BatchItem {
                description: "PRODUTO TOTALMENTE DESCONHECIDO XKWZ".to_string(),
                supplier_code: Some("F-2".to_string()),
            },
        ];

        let report = analyzer.analyze_batch(&items, false).await;

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.link_only, 1);
        assert_eq!(report.summary.register_and_link, 1);
        assert_eq!(report.summary.errors, 0);
        assert_eq!(report.items.len(), 2);
    }

    #[test]
    fn test_group_prompt_enumerates_options() {
        let groups = vec![Group {
            id: Some(1),
            code: 101,
            description: "MATERIAIS".to_string(),
            identifier: "1".to_string(),
            padrao: 1,
        }];
        let prompt = group_prompt("CIMENTO CP II", &groups);
        assert!(prompt.contains("Código 101: MATERIAIS"));
        assert!(prompt.contains("codigo_grupo"));
        assert!(prompt.contains("CIMENTO CP II"));
    }

    #[test]
    fn test_unit_prompt_enumerates_options() {
        let units = vec![Unit {
            id: Some(1),
            code: "SC".to_string(),
            description: "SACO".to_string(),
            padrao: 1,
        }];
        let prompt = unit_prompt("CIMENTO CP II 50KG", &units);
        assert!(prompt.contains("- SC: SACO"));
        assert!(prompt.contains("codigo_unidade"));
    }
}
