//! Configuration for the generative-service adapter.
//!
//! Backend selection, API endpoint, and credentials are loaded from
//! environment variables so the binary can switch providers without a
//! rebuild. The prompt template directory is configurable for the same
//! reason: prompt tuning should not require recompiling.

use crate::error::GenError;

/// Complete adapter configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// LLM backend configuration.
    pub backend: LlmBackendConfig,
    /// Path to the prompt templates directory.
    pub templates_dir: String,
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone)]
pub struct LlmBackendConfig {
    /// The backend type (openai-compatible or anthropic).
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible API (works with `OpenAI`, `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API (different request format).
    Anthropic,
}

impl GenConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `LLM_DEFAULT_BACKEND` -- backend type (`openai`, `anthropic`, ...)
    /// - `LLM_DEFAULT_API_URL` -- API base URL
    /// - `LLM_DEFAULT_API_KEY` -- API key
    /// - `LLM_DEFAULT_MODEL` -- model name
    ///
    /// Optional variables:
    /// - `TEMPLATES_DIR` -- path to prompt templates
    ///   (default `crates/sentinel-gen/templates`)
    pub fn from_env() -> Result<Self, GenError> {
        let backend = load_backend_config("LLM_DEFAULT")?;
        let templates_dir = std::env::var("TEMPLATES_DIR")
            .unwrap_or_else(|_| "crates/sentinel-gen/templates".to_owned());

        Ok(Self {
            backend,
            templates_dir,
        })
    }
}

/// Read a required environment variable.
fn env_var(name: &str) -> Result<String, GenError> {
    std::env::var(name)
        .map_err(|e| GenError::Config(format!("missing required env var {name}: {e}")))
}

/// Load an LLM backend config from a set of prefixed environment variables.
fn load_backend_config(prefix: &str) -> Result<LlmBackendConfig, GenError> {
    let backend_str = env_var(&format!("{prefix}_BACKEND"))?;
    let api_url = env_var(&format!("{prefix}_API_URL"))?;
    let api_key = env_var(&format!("{prefix}_API_KEY"))?;
    let model = env_var(&format!("{prefix}_MODEL"))?;

    let backend_type = match backend_str.to_lowercase().as_str() {
        "openai" | "deepseek" | "ollama" => BackendType::OpenAi,
        "anthropic" | "claude" => BackendType::Anthropic,
        other => {
            return Err(GenError::Config(format!(
                "unknown backend type: {other}"
            )));
        }
    };

    Ok(LlmBackendConfig {
        backend_type,
        api_url,
        api_key,
        model,
    })
}
