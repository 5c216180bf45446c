//! nexus HTTP server.
//!
//! This crate exposes the chat, key, presentation and gateway APIs over
//! axum, wiring the library crates together behind [`state::AppState`].

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod inflight;
pub mod routes;
pub mod state;
pub mod types;
