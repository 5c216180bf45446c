//! Core domain types and utilities for the nexus platform.
//!
//! This crate provides the identifiers and the error-handling alias shared by
//! every other nexus crate.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ApiKeyId, ChatSessionId, MessageId, ParseIdError, PresentationId, UserId};
