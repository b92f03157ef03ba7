//! Wire types for the Ollama HTTP API
//!
//! Request and response bodies for the endpoints the council uses:
//! `/api/generate`, `/api/tags`, `/api/pull` and `/api/create`. The
//! real responses carry many more fields (timings, digests, model
//! details); serde ignores everything not listed here.

use serde::{Deserialize, Serialize};

/// Body for `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Always `false`: the council waits for complete responses.
    pub stream: bool,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
        }
    }
}

/// Response from `POST /api/generate` (non-streaming).
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}

/// Response from `GET /api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One installed model, as listed by `/api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

/// Body for `POST /api/pull`.
#[derive(Debug, Clone, Serialize)]
pub struct PullRequest {
    pub model: String,
    pub stream: bool,
}

impl PullRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            stream: false,
        }
    }
}

/// Body for `POST /api/create`.
///
/// Derives a new model from an installed base model, baking `system`
/// in as the derived model's system prompt.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRequest {
    pub model: String,
    pub from: String,
    pub system: String,
    pub stream: bool,
}

impl CreateRequest {
    pub fn new(
        model: impl Into<String>,
        from: impl Into<String>,
        system: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            from: from.into(),
            system: system.into(),
            stream: false,
        }
    }
}

/// Terse `{"status": "..."}` body returned by pull and create.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
