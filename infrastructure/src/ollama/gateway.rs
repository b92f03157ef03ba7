//! Ollama generation gateway
//!
//! Implements [`GenerationGateway`] over the Ollama HTTP API. Every
//! discussion turn and every ballot is one non-streaming `/api/generate`
//! call; the remaining endpoints are used once at startup to provision
//! the roster's persona models.
//!
//! Local models can take minutes on a single response, so the HTTP
//! client carries a deliberately long timeout.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use council_application::ports::generation::{GenerationError, GenerationGateway};

use super::types::{
    CreateRequest, GenerateRequest, GenerateResponse, PullRequest, StatusResponse, TagsResponse,
};

/// Default Ollama endpoint for a local install.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default per-request timeout. Generation on CPU-bound hosts is slow.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Port assumed when the configured address names none.
const DEFAULT_PORT: u16 = 11434;

/// Normalize a configured server address.
///
/// Accepts `host`, `host:port`, or a full URL; a missing scheme becomes
/// `http://` and a missing port becomes the Ollama default. An explicit
/// `:80` or `:443` is a choice, not an omission, and is left alone.
fn normalize_base_url(raw: &str) -> Result<String, GenerationError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let mut url = reqwest::Url::parse(&with_scheme).map_err(|e| {
        GenerationError::ConnectionError(format!("Invalid base URL '{}': {}", raw, e))
    })?;
    let explicit_default_port = trimmed.ends_with(":80") || trimmed.ends_with(":443");
    if url.port().is_none() && !explicit_default_port {
        url.set_port(Some(DEFAULT_PORT)).map_err(|_| {
            GenerationError::ConnectionError(format!("Cannot set a port on '{}'", raw))
        })?;
    }

    Ok(url.to_string().trim_end_matches('/').to_string())
}

/// [`GenerationGateway`] backed by an Ollama server.
#[derive(Debug)]
pub struct OllamaGateway {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaGateway {
    /// Build a gateway for the server at `base_url`. Bare `host` and
    /// `host:port` forms are accepted; a missing scheme defaults to
    /// `http://` and a missing port to the Ollama default.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                GenerationError::ConnectionError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            base_url: normalize_base_url(&base_url.into())?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, GenerationError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| classify_send_error(path, &e))?;
        check_http_status(path, &response)?;
        Ok(response)
    }
}

/// Map a reqwest send error onto the gateway error taxonomy.
fn classify_send_error(path: &str, err: &reqwest::Error) -> GenerationError {
    if err.is_connect() || err.is_timeout() {
        GenerationError::ConnectionError(format!("{}: {}", path, err))
    } else {
        GenerationError::RequestFailed(format!("{}: {}", path, err))
    }
}

fn check_http_status(path: &str, response: &reqwest::Response) -> Result<(), GenerationError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(GenerationError::RequestFailed(format!(
            "{} returned HTTP {} {}",
            path,
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )))
    }
}

#[async_trait]
impl GenerationGateway for OllamaGateway {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        debug!(model, prompt_len = prompt.len(), "Sending generate request");
        let request = GenerateRequest::new(model, prompt);
        let response = self.post_json("generate", &request).await?;
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(format!("generate: {}", e)))?;
        debug!(
            model,
            response_len = body.response.len(),
            "Generate request completed"
        );
        Ok(body.response)
    }

    async fn available_models(&self) -> Result<Vec<String>, GenerationError> {
        let response = self
            .client
            .get(self.endpoint("tags"))
            .send()
            .await
            .map_err(|e| classify_send_error("tags", &e))?;
        check_http_status("tags", &response)?;
        let body: TagsResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(format!("tags: {}", e)))?;
        Ok(body.models.into_iter().map(|m| m.name).collect())
    }

    async fn pull_model(&self, model: &str) -> Result<(), GenerationError> {
        info!(model, "Pulling base model");
        let request = PullRequest::new(model);
        let response = self.post_json("pull", &request).await?;
        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(format!("pull: {}", e)))?;
        debug!(model, status = %body.status, "Pull completed");
        Ok(())
    }

    async fn create_persona_model(
        &self,
        name: &str,
        base: &str,
        system: &str,
    ) -> Result<(), GenerationError> {
        info!(name, base, "Creating persona model");
        let request = CreateRequest::new(name, base, system);
        let response = self.post_json("create", &request).await?;
        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(format!("create: {}", e)))?;
        if !body.is_success() {
            return Err(GenerationError::ProvisioningFailed {
                model: name.to_string(),
                reason: format!("create returned status '{}'", body.status),
            });
        }
        Ok(())
    }
}
