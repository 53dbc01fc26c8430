//! REST client for the ERP catalog API.
//!
//! Thin I/O adapter implementing [`CatalogApi`]: token authentication
//! (`POST /Auth/SignIn` with a `TenantId` header), bearer-authenticated
//! reads and writes, and a single re-authentication retry when a request
//! comes back 401 (expired token).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use prodmatch_core::catalog::CatalogApi;
use prodmatch_core::models::{CatalogProduct, Group, RegistrationData, Unit};

use crate::config::ApiConfig;

pub struct ErpClient {
    http: reqwest::Client,
    base_url: String,
    tenant_id: String,
    username: String,
    password: String,
    token: RwLock<Option<String>>,
}

impl ErpClient {
    /// Build a client from configuration. The password comes from the
    /// `ERP_PASSWORD` environment variable, never the config file.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let password =
            std::env::var("ERP_PASSWORD").context("ERP_PASSWORD environment variable not set")?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tenant_id: config.tenant_id.clone(),
            username: config.username.clone(),
            password,
            token: RwLock::new(None),
        })
    }

    async fn sign_in(&self) -> Result<String> {
        let url = format!("{}/Auth/SignIn", self.base_url);
        let body = serde_json::json!({
            "UserName": self.username,
            "Password": self.password,
        });

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("TenantId", &self.tenant_id)
            .json(&body)
            .send()
            .await
            .context("SignIn request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Authentication failed: {status} - {text}");
        }

        let json: serde_json::Value = response.json().await?;
        let token = json
            .get("accessToken")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .with_context(|| format!("accessToken missing in SignIn response: {json}"))?;

        debug!("authenticated against {}", self.base_url);
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    async fn token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.sign_in().await
    }

    /// Send a request with the bearer token; re-authenticate once on 401.
    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut token = self.token().await?;

        for attempt in 0..2 {
            let mut request = self
                .http
                .request(method.clone(), &url)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {token}"))
                .header("TenantId", &self.tenant_id);
            if let Some(b) = body {
                request = request.json(b);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("request to {url} failed"))?;
            let status = response.status();

            if status.is_success() {
                return response
                    .json()
                    .await
                    .with_context(|| format!("invalid JSON from {url}"));
            }

            if status.as_u16() == 401 && attempt == 0 {
                debug!("token rejected, re-authenticating");
                token = self.sign_in().await?;
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            bail!("ERP API error on {path}: {status} - {text}");
        }

        unreachable!("send loop exits via return or bail");
    }
}

#[async_trait]
impl CatalogApi for ErpClient {
    async fn fetch_products(&self) -> Result<Vec<CatalogProduct>> {
        let json = self.send(reqwest::Method::GET, "/produto/Produto", None).await?;
        let products: Vec<CatalogProduct> =
            serde_json::from_value(json).context("unexpected products payload shape")?;
        debug!(count = products.len(), "catalog snapshot loaded");
        Ok(products)
    }

    async fn create_product(&self, registration: &RegistrationData) -> Result<serde_json::Value> {
        let body = serde_json::to_value(registration)?;
        self.send(reqwest::Method::POST, "/produto/Produto", Some(&body))
            .await
    }

    async fn fetch_groups(&self) -> Result<Vec<Group>> {
        let json = self.send(reqwest::Method::GET, "/produto/Grupo", None).await?;
        serde_json::from_value(json).context("unexpected groups payload shape")
    }

    async fn fetch_units(&self) -> Result<Vec<Unit>> {
        let json = self.send(reqwest::Method::GET, "/produto/Unidade", None).await?;
        serde_json::from_value(json).context("unexpected units payload shape")
    }
}
