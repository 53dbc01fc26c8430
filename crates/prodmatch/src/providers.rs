//! AI provider implementations for re-ranking and classification.
//!
//! Two providers bind the same semantic contract ([`AiProvider`]):
//!
//! - **[`OpenAiProvider`]** — chat completions with enforced JSON output
//!   (`response_format: json_object`).
//! - **[`AnthropicProvider`]** — messages API; the JSON object is
//!   extracted from the text reply.
//!
//! Provider selection happens once, at construction, via
//! [`create_provider`]. Both providers convert transport and parse
//! problems into [`AiFailure`] values — the engine treats those as "AI
//! unavailable" and falls back to deterministic scoring.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use prodmatch_core::models::Candidate;
use prodmatch_core::rerank::{AiFailure, AiProvider, Reranking};

use crate::config::AiConfig;

/// System prompt for the re-ranking call. The equivalence rules are the
/// contract: brands, certification codes, model codes, sizes, and colors
/// are ignored; measurements break categories; named categories never
/// conflate.
const RERANK_SYSTEM_PROMPT: &str = r#"Você é um especialista em matching de produtos para construção civil, EPIs, materiais e insumos.

Sua tarefa é analisar uma descrição de produto buscada e uma lista de candidatos, retornando um ranking preciso.

REGRAS CRÍTICAS DE EQUIVALÊNCIA:
1. FOQUE NO PRODUTO ESSENCIAL, IGNORE DETALHES:
   - Marcas (MARLUVAS, VONDER, TRAMONTINA) → IGNORAR na comparação
   - Certificados (C.A 13808, INMETRO) → IGNORAR
   - Códigos de modelo (50B26, XYZ123) → IGNORAR
   - Tamanhos/Numerações (N.42, TAM G, Nº 10) → IGNORAR (a menos que mude categoria)
   - Cores específicas → IGNORAR (a menos que seja essencial)

2. PRODUTOS EQUIVALENTES (DEVEM TER SCORE ALTO 80-95):
   - "BOTINA NOBUCK MARLUVAS C.A 13808 50B26 N.42" = "BOTINA DE COURO" = "BOTINA SEGURANÇA"
   - "LUVA NITRÍLICA DANNY TAMANHO M" = "LUVA DE PROTEÇÃO" = "LUVA SEGURANÇA"
   - "CIMENTO CP II 50KG VOTORAN" = "CIMENTO" = "CIMENTO PORTLAND"
   - "PARAFUSO SEXTAVADO GALV 3/8X1.1/2" = "PARAFUSO SEXTAVADO 3/8" = "PARAFUSO 3/8"
   - "FIO FLEXÍVEL 2,5MM VERMELHO 100M" = "FIO 2,5MM" = "CABO 2,5MM"

3. CATEGORIAS QUE DEVEM CASAR:
   - EPIs: botina/bota, luva, capacete, óculos, protetor auricular → mesmo tipo = equivalente
   - Fixadores: parafuso, prego, bucha → mesmo tipo/medida base = equivalente
   - Elétricos: fio, cabo, disjuntor → mesmo tipo/amperagem = equivalente
   - Construção: cimento, areia, tijolo, bloco → mesmo material = equivalente

4. MEDIDAS IMPORTANTES (afetam score):
   - Parafusos: 3/8 x 1" ≠ 1/4 x 2" (medidas diferentes = produtos diferentes)
   - Fios: 2,5mm ≠ 4mm (bitola diferente = produto diferente)
   - Volume: 5L ≈ 5LT, mas considere 18L se não houver 5L disponível

5. NUNCA CONFUNDIR CATEGORIAS DIFERENTES:
   - CERA ≠ TINTA (mesmo que tenha "cor giz de cera")
   - SABÃO ≠ DETERGENTE
   - BOTINA ≠ SAPATO SOCIAL

SCORES:
- 90-100: Match exato ou muito próximo (mesmo produto, pode variar marca/tamanho)
- 80-89: Equivalente funcional (mesmo tipo de produto, especificações similares)
- 70-79: Possível equivalente (mesma categoria, especificações podem diferir)
- 50-69: Match parcial (relacionado mas pode não servir)
- 0-49: Não é o produto buscado

Responda SEMPRE em JSON com a estrutura:
{
  "analise": [
    {
      "codigo": "string",
      "score": 0-100,
      "confianca": "ALTA|MEDIA|BAIXA",
      "justificativa": "string curta",
      "match_exato": true|false
    }
  ],
  "sugestao_cadastro": true|false,
  "observacao": "string opcional"
}"#;

/// Condensed system prompt for the Anthropic binding (token economy).
const ANTHROPIC_RERANK_SYSTEM_PROMPT: &str = r#"Você é um especialista em matching de produtos para construção civil, EPIs e materiais.

REGRAS CRÍTICAS - FOQUE NO PRODUTO ESSENCIAL:
1. IGNORE: marcas, certificados (C.A), códigos, tamanhos, numerações, cores
2. "BOTINA NOBUCK MARLUVAS C.A 13808 N.42" = "BOTINA DE COURO" (score 85+)
3. EPIs do mesmo tipo = equivalentes (botina=botina, luva=luva, capacete=capacete)
4. Parafusos: foque na medida base (3/8, 1/4), ignore detalhes
5. Fios/Cabos: foque na bitola (2,5mm, 4mm)
6. NUNCA confunda categorias: CERA ≠ TINTA, SABÃO ≠ DETERGENTE

SCORES: 90-100=exato, 80-89=equivalente, 70-79=possível, <70=diferente

Responda APENAS com JSON válido:
{"analise":[{"codigo":"X","score":0-100,"confianca":"ALTA|MEDIA|BAIXA","justificativa":"...","match_exato":bool}],"sugestao_cadastro":bool}"#;

const CLASSIFY_SYSTEM_PROMPT: &str = "Você é um especialista em classificação de produtos \
para construção civil e materiais. Responda sempre em JSON válido.";

/// Build the user prompt enumerating the candidate list.
fn rerank_prompt(
    query: &str,
    candidates: &[Candidate],
    context: Option<&str>,
    include_pre_scores: bool,
    cap: Option<usize>,
) -> String {
    let shown = match cap {
        Some(n) => &candidates[..candidates.len().min(n)],
        None => candidates,
    };

    let listing: Vec<String> = shown
        .iter()
        .map(|c| {
            if include_pre_scores {
                format!("- [{}] {} (score_pre: {})", c.code, c.description, c.pre_score)
            } else {
                format!("[{}] {}", c.code, c.description)
            }
        })
        .collect();

    let mut prompt = format!(
        "PRODUTO BUSCADO: \"{}\"\n\nCANDIDATOS PRÉ-FILTRADOS:\n{}\n\nAnalise cada candidato e retorne o ranking ordenado por relevância.",
        query,
        listing.join("\n")
    );

    if let Some(ctx) = context {
        prompt.push_str(&format!("\n\nCONTEXTO ADICIONAL: {ctx}"));
    }

    prompt
}

/// Extract the outermost JSON object from a free-text reply.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client, AiFailure> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AiFailure::Transport(e.to_string()))
}

// ============ OpenAI Provider ============

/// Re-ranking and classification via the OpenAI chat completions API.
///
/// Requires `OPENAI_API_KEY` in the environment. Uses temperature 0.1 and
/// `response_format: json_object`, so replies parse directly against the
/// strict contract.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiProvider {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ => bail!("OPENAI_API_KEY environment variable not set"),
        };

        Ok(Self {
            api_key,
            model: config.openai_model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, AiFailure> {
        let client = http_client(self.timeout_secs)?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": 0.1,
            "response_format": {"type": "json_object"},
        });

        let response = client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AiFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(AiFailure::Transport(format!(
                "OpenAI API error {status}: {body_text}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiFailure::Parse(e.to_string()))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AiFailure::Parse("missing choices[0].message.content".to_string()))
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn rerank(
        &self,
        query: &str,
        candidates: &[Candidate],
        context: Option<&str>,
    ) -> Result<Reranking, AiFailure> {
        let prompt = rerank_prompt(query, candidates, context, true, None);
        let content = self.chat(RERANK_SYSTEM_PROMPT, &prompt).await?;
        debug!(provider = "openai", bytes = content.len(), "rerank reply");

        serde_json::from_str(&content).map_err(|e| AiFailure::Parse(e.to_string()))
    }

    async fn classify(&self, prompt: &str) -> Result<serde_json::Value, AiFailure> {
        let content = self.chat(CLASSIFY_SYSTEM_PROMPT, prompt).await?;
        serde_json::from_str(&content).map_err(|e| AiFailure::Parse(e.to_string()))
    }
}

// ============ Anthropic Provider ============

/// Re-ranking and classification via the Anthropic messages API.
///
/// Requires `ANTHROPIC_API_KEY` in the environment. Candidate lists are
/// capped at 15 for token economy, and the JSON object is extracted from
/// the model's text reply.
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    timeout_secs: u64,
}

/// Candidate cap for the Anthropic prompt.
const ANTHROPIC_CANDIDATE_CAP: usize = 15;

impl AnthropicProvider {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = match std::env::var("ANTHROPIC_API_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ => bail!("ANTHROPIC_API_KEY environment variable not set"),
        };

        Ok(Self {
            api_key,
            model: config.anthropic_model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    async fn message(&self, system: &str, user: &str) -> Result<String, AiFailure> {
        let client = http_client(self.timeout_secs)?;

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 1500,
            "system": system,
            "messages": [{"role": "user", "content": user}],
        });

        let response = client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AiFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(AiFailure::Transport(format!(
                "Anthropic API error {status}: {body_text}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiFailure::Parse(e.to_string()))?;

        json["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AiFailure::Parse("missing content[0].text".to_string()))
    }
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn rerank(
        &self,
        query: &str,
        candidates: &[Candidate],
        context: Option<&str>,
    ) -> Result<Reranking, AiFailure> {
        let prompt = rerank_prompt(
            query,
            candidates,
            context,
            false,
            Some(ANTHROPIC_CANDIDATE_CAP),
        );
        let text = self.message(ANTHROPIC_RERANK_SYSTEM_PROMPT, &prompt).await?;
        debug!(provider = "anthropic", bytes = text.len(), "rerank reply");

        let json = extract_json(&text)
            .ok_or_else(|| AiFailure::Parse("no JSON object in reply".to_string()))?;
        serde_json::from_str(json).map_err(|e| AiFailure::Parse(e.to_string()))
    }

    async fn classify(&self, prompt: &str) -> Result<serde_json::Value, AiFailure> {
        let text = self.message(CLASSIFY_SYSTEM_PROMPT, prompt).await?;
        let json = extract_json(&text)
            .ok_or_else(|| AiFailure::Parse("no JSON object in reply".to_string()))?;
        serde_json::from_str(json).map_err(|e| AiFailure::Parse(e.to_string()))
    }
}

// ============ Provider Selection ============

/// Instantiate the configured AI provider.
///
/// `auto` picks OpenAI when `OPENAI_API_KEY` is set, else Anthropic when
/// `ANTHROPIC_API_KEY` is set, else none (deterministic pre-filter only).
/// Explicitly requesting a provider without its key is a hard
/// configuration error.
pub fn create_provider(config: &AiConfig) -> Result<Option<Box<dyn AiProvider>>> {
    match config.provider.as_str() {
        "disabled" => Ok(None),
        "openai" => Ok(Some(Box::new(OpenAiProvider::new(config)?))),
        "anthropic" => Ok(Some(Box::new(AnthropicProvider::new(config)?))),
        "auto" => {
            if std::env::var("OPENAI_API_KEY").map(|k| !k.is_empty()).unwrap_or(false) {
                Ok(Some(Box::new(OpenAiProvider::new(config)?)))
            } else if std::env::var("ANTHROPIC_API_KEY").map(|k| !k.is_empty()).unwrap_or(false) {
                Ok(Some(Box::new(AnthropicProvider::new(config)?)))
            } else {
                Ok(None)
            }
        }
        other => bail!("Unknown ai provider: '{}'", other),
    }
}
