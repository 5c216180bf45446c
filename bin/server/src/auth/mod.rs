//! Authentication module for the nexus server.
//!
//! This module provides:
//! - Email/password and federated sign-in through the identity provider
//! - The `RequireAuth` extractor for bearer-authenticated routes
//!
//! The server keeps no session state of its own: the bearer token is the
//! provider's ID token and is resolved to a profile on every request.

pub mod middleware;
pub mod routes;

pub use middleware::{AuthRejection, RequireAuth, bearer_token};
pub use routes::{federated, login, me, register};
