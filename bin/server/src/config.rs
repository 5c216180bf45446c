//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables, with `__`
//! separating nested keys (`INFERENCE__API_KEY` sets `inference.api_key`).

use nexus_ai::dispatcher::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use nexus_ai::gemini::DEFAULT_BASE_URL;
use nexus_ai::{GeminiConfig, ModelSelection};
use nexus_conversation::MAX_SESSIONS_PER_USER;
use nexus_platform_access::IdentityConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection URL. Records are kept in memory when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Chat sessions kept per user before the idlest is evicted.
    #[serde(default = "default_max_sessions_per_user")]
    pub max_sessions_per_user: usize,

    /// Inference backend configuration.
    pub inference: InferenceConfig,

    /// Identity provider configuration.
    pub identity: IdentityConfig,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_sessions_per_user() -> usize {
    MAX_SESSIONS_PER_USER
}

/// Inference backend settings.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// API credential.
    pub api_key: String,

    #[serde(default = "default_inference_base_url")]
    pub base_url: String,

    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Per-request timeout. Unset means wait for the backend.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_inference_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

impl InferenceConfig {
    /// Client settings for the inference backend.
    #[must_use]
    pub fn client_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    /// Models the dispatcher should use.
    #[must_use]
    pub fn models(&self) -> ModelSelection {
        ModelSelection {
            text_model: self.text_model.clone(),
            image_model: self.image_model.clone(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
