use std::future::Future;

use serde_json::Value;

use crate::error::{DiscoveryError, GenerationError};
use crate::model::{GenerationResult, LanguageCatalog, Mode};

/// Operations offered by the remote code generation service.
pub trait GenerationApi {
    /// Fetch the languages and frameworks the service can generate.
    fn fetch_languages(&self) -> impl Future<Output = Result<LanguageCatalog, DiscoveryError>> + Send;

    /// Generate client code for `language` from `spec`.
    fn generate_client(
        &self,
        language: &str,
        spec: &Value,
    ) -> impl Future<Output = Result<GenerationResult, GenerationError>> + Send;

    /// Generate server code for `framework` from `spec`.
    fn generate_server(
        &self,
        framework: &str,
        spec: &Value,
    ) -> impl Future<Output = Result<GenerationResult, GenerationError>> + Send;

    /// Dispatch to the endpoint matching `mode`.
    fn generate(
        &self,
        mode: Mode,
        language: &str,
        spec: &Value,
    ) -> impl Future<Output = Result<GenerationResult, GenerationError>> + Send
    where
        Self: Sync,
    {
        async move {
            match mode {
                Mode::Client => self.generate_client(language, spec).await,
                Mode::Server => self.generate_server(language, spec).await,
            }
        }
    }
}

/// Fetches an OpenAPI document from a user-supplied URL.
pub trait SpecFetcher {
    /// Return the raw body at `url`, or a short human-readable reason.
    fn fetch_spec(&self, url: &str) -> impl Future<Output = Result<String, String>> + Send;
}
