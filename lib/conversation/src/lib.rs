//! Chat transcripts for the nexus platform.
//!
//! This crate provides:
//!
//! - **Sessions**: append-only transcripts owned by one user
//! - **Renderer**: view structures for text, slide decks and images
//! - **Presentations**: the slide deck payload shape

pub mod error;
pub mod memory;
pub mod message;
pub mod presentation;
pub mod render;
pub mod session;

pub use error::SessionError;
pub use memory::{InMemorySessionManager, MAX_SESSIONS_PER_USER};
pub use message::{EMPTY_REPLY, GREETING, Message, MessageRole};
pub use presentation::{PresentationData, PresentationMetadata, Slide, unwrap_single};
pub use render::{RenderedContent, TextSegment, render, render_message, render_result};
pub use session::{ChatSession, SessionManager};
