use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde_json::{Value, json};
use thiserror::Error;

use oagp_core::config::{DEFAULT_BASE_URL, ServiceConfig};
use oagp_core::error::{DiscoveryError, GenerationError};
use oagp_core::{GenerationApi, GenerationResult, LanguageCatalog, SpecFetcher};

use crate::discovery;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid service base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Builder for [`ApiGateway`].
#[derive(Debug, Clone)]
pub struct GatewayBuilder {
    base_url: String,
    timeout: Option<Duration>,
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ApiGateway, GatewayError> {
        let base_url = Url::parse(&self.base_url).map_err(|e| GatewayError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl {
                url: self.base_url,
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(ApiGateway {
            http: http.build()?,
            base_url,
        })
    }
}

/// Client for the remote generation service.
///
/// Every call is a single independent request: no retries, no caching.
#[derive(Debug, Clone)]
pub struct ApiGateway {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiGateway {
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, GatewayError> {
        let mut builder = GatewayBuilder::new().base_url(&config.base_url);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_generate(
        &self,
        kind: &str,
        target: &str,
        spec: &Value,
    ) -> Result<GenerationResult, GenerationError> {
        let url = self.endpoint(&["gen", kind, target]);
        log::debug!("POST {url}");

        let response = self
            .http
            .post(url)
            .json(&json!({ "spec": spec }))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| {
            GenerationError::Decode(format!("{}: {}", e, String::from_utf8_lossy(&body)))
        })
    }
}

/// The service's `message` field when the error body is JSON, otherwise the
/// trimmed body, otherwise the status reason.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

impl GenerationApi for ApiGateway {
    async fn fetch_languages(&self) -> Result<LanguageCatalog, DiscoveryError> {
        let url = self.endpoint(&["swagger.json"]);
        log::debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DiscoveryError::Transport(e.to_string()))
            .inspect_err(|e| log::error!("error fetching languages: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            log::error!("error fetching languages: status {status}");
            return Err(DiscoveryError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DiscoveryError::Transport(e.to_string()))
            .inspect_err(|e| log::error!("error fetching languages: {e}"))?;

        discovery::parse_catalog(&body).inspect_err(|e| log::error!("error fetching languages: {e}"))
    }

    async fn generate_client(
        &self,
        language: &str,
        spec: &Value,
    ) -> Result<GenerationResult, GenerationError> {
        self.post_generate("clients", language, spec)
            .await
            .inspect_err(|e| log::error!("error generating client: {e}"))
    }

    async fn generate_server(
        &self,
        framework: &str,
        spec: &Value,
    ) -> Result<GenerationResult, GenerationError> {
        self.post_generate("servers", framework, spec)
            .await
            .inspect_err(|e| log::error!("error generating server: {e}"))
    }
}

impl SpecFetcher for ApiGateway {
    async fn fetch_spec(&self, url: &str) -> Result<String, String> {
        log::debug!("GET {url}");
        let response = self.http.get(url).send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        response.text().await.map_err(|e| e.to_string())
    }
}
