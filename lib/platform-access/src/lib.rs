//! Platform access for nexus.
//!
//! This crate provides:
//! - The [`IdentityProvider`] seam and its REST implementation
//! - User profiles (`UserProfile`) as reported by the provider
//! - Signed-in sessions (`AuthSession`)
//! - Authentication error types with user-safe messages
//!
//! # Example
//!
//! ```
//! use nexus_platform_access::{AuthenticationError, UserProfile};
//! use nexus_core::UserId;
//!
//! let profile = UserProfile::new(UserId::new("uid_1")).with_email("ada@example.com");
//! assert_eq!(profile.label(), "ada@example.com");
//!
//! let err = AuthenticationError::Rejected {
//!     code: "auth/wrong-password".to_string(),
//! };
//! assert_eq!(err.user_message(), "Wrong password");
//! ```

pub mod error;
pub mod identity;
pub mod session;
pub mod user;

// Re-export main types at crate root
pub use error::{AuthenticationError, clean_provider_message};
pub use identity::{IdentityConfig, IdentityProvider, IdentityToolkitClient};
pub use session::AuthSession;
pub use user::UserProfile;
