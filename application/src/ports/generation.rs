//! Generation gateway port
//!
//! The council talks to its language-model backend exclusively through
//! [`GenerationGateway`]. Adapters implement it for a concrete backend
//! (the default one speaks the Ollama HTTP API) and the deliberation
//! engine stays transport-agnostic.

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by generation backends.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Generation request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Provisioning failed for model '{model}': {reason}")]
    ProvisioningFailed { model: String, reason: String },
}

/// Abstraction over a text-generation backend.
///
/// `generate` is the hot path used on every discussion turn and every
/// vote. The remaining methods exist for roster provisioning at startup:
/// listing what is installed, pulling base models, and deriving persona
/// models with a baked-in system prompt.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Send one instruction to `model` and wait for the complete response text.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;

    /// Names of the models currently installed on the backend.
    async fn available_models(&self) -> Result<Vec<String>, GenerationError>;

    /// Pull a base model onto the backend.
    async fn pull_model(&self, model: &str) -> Result<(), GenerationError>;

    /// Create `name` derived from `base`, with `system` installed as its
    /// system prompt. Used to materialize participant personas.
    async fn create_persona_model(
        &self,
        name: &str,
        base: &str,
        system: &str,
    ) -> Result<(), GenerationError>;
}
