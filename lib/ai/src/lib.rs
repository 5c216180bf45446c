//! AI primitives for the nexus platform.
//!
//! This crate turns a raw user message into an [`InferenceResult`]:
//!
//! - **Intent**: keyword classification of the message
//! - **Persona**: the system instruction bundle chosen by the user
//! - **Dispatcher**: builds the backend request and swallows backend failures
//! - **Gemini**: REST client for the hosted inference API

pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod gemini;
pub mod intent;
pub mod persona;
pub mod result;

pub use backend::{
    ContentRole, GenerationConfig, HistoryTurn, ImageRequest, ImageResponse, InferenceBackend,
    InlineImage, TextRequest, TextResponse, TokenUsage,
};
pub use dispatcher::{ConverseRequest, ModelDispatcher, ModelSelection};
pub use error::LlmError;
pub use gemini::{GeminiBackend, GeminiConfig};
pub use intent::{Intent, classify};
pub use persona::ModelPersona;
pub use result::{ContentKind, InferenceResult};
