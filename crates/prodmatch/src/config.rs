use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub tenant_id: String,
    pub username: String,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

fn default_api_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_weight_prefilter")]
    pub weight_prefilter: f64,
    #[serde(default = "default_weight_ai")]
    pub weight_ai: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            timeout_secs: default_ai_timeout(),
            weight_prefilter: default_weight_prefilter(),
            weight_ai: default_weight_ai(),
        }
    }
}

fn default_provider() -> String {
    "auto".to_string()
}
fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}
fn default_ai_timeout() -> u64 {
    60
}
fn default_weight_prefilter() -> f64 {
    0.3
}
fn default_weight_ai() -> f64 {
    0.7
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    5
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }
    if config.api.tenant_id.trim().is_empty() {
        anyhow::bail!("api.tenant_id must not be empty");
    }

    if config.matching.limit < 1 {
        anyhow::bail!("matching.limit must be >= 1");
    }

    if config.ai.weight_prefilter < 0.0 || config.ai.weight_ai < 0.0 {
        anyhow::bail!("ai.weight_prefilter and ai.weight_ai must be >= 0");
    }
    let weight_sum = config.ai.weight_prefilter + config.ai.weight_ai;
    if (weight_sum - 1.0).abs() > 1e-6 {
        anyhow::bail!("ai weights must sum to 1.0 (got {weight_sum})");
    }

    match config.ai.provider.as_str() {
        "auto" | "openai" | "anthropic" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown ai provider: '{}'. Must be auto, openai, anthropic, or disabled.",
            other
        ),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const MINIMAL: &str = r#"
[api]
base_url = "https://rest.example.com/api"
tenant_id = "tenant-1"
username = "svc.user"
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let file = write_config(MINIMAL);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.ai.provider, "auto");
        assert_eq!(config.ai.openai_model, "gpt-4o-mini");
        assert!((config.ai.weight_prefilter - 0.3).abs() < 1e-9);
        assert!((config.ai.weight_ai - 0.7).abs() < 1e-9);
        assert_eq!(config.matching.limit, 5);
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let file = write_config(&format!(
            "{MINIMAL}\n[ai]\nweight_prefilter = 0.5\nweight_ai = 0.7\n"
        ));
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let file = write_config(&format!("{MINIMAL}\n[ai]\nprovider = \"cohere\"\n"));
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let file = write_config(&format!("{MINIMAL}\n[matching]\nlimit = 0\n"));
        assert!(load_config(file.path()).is_err());
    }
}
