//! Routes a classified message to the inference backend.
//!
//! Every branch swallows backend failures: the caller always gets an
//! [`InferenceResult`], with a fixed apology text when the backend failed.

use crate::backend::{GenerationConfig, HistoryTurn, ImageRequest, InferenceBackend, TextRequest};
use crate::intent::{Intent, classify};
use crate::persona::{DICTIONARY_INSTRUCTION, ModelPersona};
use crate::result::InferenceResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Default model for text and dictionary requests.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
/// Default model for image requests.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

pub const CONGESTED_MESSAGE: &str = "My neural pathways are currently congested. Try again.";
pub const WORD_NOT_FOUND_MESSAGE: &str = "Word not found in my lexicon.";
pub const IMAGE_COMPLETE_MESSAGE: &str = "Visual synthesis complete.";
pub const NO_IMAGE_MESSAGE: &str = "I could not synthesize a visual representation at this time.";
pub const IMAGE_FAILURE_MESSAGE: &str = "Visual cortex error.";

/// Which backend models the dispatcher uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub text_model: String,
    pub image_model: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

/// One user turn to be answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverseRequest {
    /// The raw user message.
    pub message: String,
    /// Persona chosen for this request.
    #[serde(default)]
    pub persona: ModelPersona,
    /// Prior turns of the conversation.
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
    /// Caller-supplied settings layered over the computed ones.
    #[serde(default)]
    pub overrides: GenerationConfig,
}

impl ConverseRequest {
    /// Creates a request with no history and no overrides.
    #[must_use]
    pub fn new(message: impl Into<String>, persona: ModelPersona) -> Self {
        Self {
            message: message.into(),
            persona,
            history: Vec::new(),
            overrides: GenerationConfig::default(),
        }
    }

    /// Sets the conversation history.
    #[must_use]
    pub fn with_history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.history = history;
        self
    }

    /// Sets the configuration overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: GenerationConfig) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Dispatches user messages to an inference backend.
#[derive(Clone)]
pub struct ModelDispatcher {
    backend: Arc<dyn InferenceBackend>,
    models: ModelSelection,
}

impl ModelDispatcher {
    /// Creates a dispatcher using the default models.
    #[must_use]
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self::with_models(backend, ModelSelection::default())
    }

    /// Creates a dispatcher with explicit model names.
    #[must_use]
    pub fn with_models(backend: Arc<dyn InferenceBackend>, models: ModelSelection) -> Self {
        Self { backend, models }
    }

    /// Returns the model used for text requests.
    #[must_use]
    pub fn text_model(&self) -> &str {
        &self.models.text_model
    }

    /// Answers a user message.
    #[instrument(skip_all, fields(persona = %request.persona, history = request.history.len()))]
    pub async fn converse(&self, request: &ConverseRequest) -> InferenceResult {
        let intent = classify(&request.message);
        debug!(?intent, "classified message");

        match intent {
            Intent::Image => self.generate_image(&request.message).await,
            Intent::Dictionary => self.consult_dictionary(&request.message).await,
            Intent::Conversation => self.talk(request).await,
        }
    }

    /// Answers a user message unless `token` is cancelled first.
    ///
    /// Returns `None` when the request was abandoned.
    pub async fn converse_cancellable(
        &self,
        request: &ConverseRequest,
        token: &CancellationToken,
    ) -> Option<InferenceResult> {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!("request cancelled before completion");
                None
            }
            result = self.converse(request) => Some(result),
        }
    }

    async fn talk(&self, request: &ConverseRequest) -> InferenceResult {
        let mut config = GenerationConfig::new()
            .with_system_instruction(request.persona.system_instruction())
            .merge(&request.overrides);

        if request.persona.is_structured() {
            config = config.with_json_output();
        }

        let text_request = if request.history.is_empty() {
            TextRequest::single_shot(&self.models.text_model, &request.message, config)
        } else {
            TextRequest::chat(
                &self.models.text_model,
                request.history.clone(),
                &request.message,
                config,
            )
        };

        match self.backend.generate_text(&text_request).await {
            Ok(response) => InferenceResult::of_kind(response.text, request.persona.response_kind()),
            Err(e) => {
                warn!(
                    error = %e,
                    provider = self.backend.provider(),
                    model = %self.models.text_model,
                    "conversation request failed"
                );
                InferenceResult::text(CONGESTED_MESSAGE)
            }
        }
    }

    async fn consult_dictionary(&self, query: &str) -> InferenceResult {
        let config = GenerationConfig::new()
            .with_system_instruction(DICTIONARY_INSTRUCTION)
            .with_json_output();
        let request = TextRequest::single_shot(&self.models.text_model, query, config);

        match self.backend.generate_text(&request).await {
            Ok(response) => InferenceResult::json(response.text),
            Err(e) => {
                warn!(error = %e, provider = self.backend.provider(), "dictionary lookup failed");
                InferenceResult::text(WORD_NOT_FOUND_MESSAGE)
            }
        }
    }

    async fn generate_image(&self, prompt: &str) -> InferenceResult {
        let request = ImageRequest::new(&self.models.image_model, prompt);

        match self.backend.generate_image(&request).await {
            Ok(response) => match response.first_image() {
                Some(image) => InferenceResult::image(IMAGE_COMPLETE_MESSAGE, image.data_uri()),
                None => {
                    debug!("image response carried no inline image");
                    InferenceResult::text(NO_IMAGE_MESSAGE)
                }
            },
            Err(e) => {
                warn!(error = %e, provider = self.backend.provider(), "image generation failed");
                InferenceResult::text(IMAGE_FAILURE_MESSAGE)
            }
        }
    }
}
