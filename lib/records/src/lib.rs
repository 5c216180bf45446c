//! API key and saved presentation records for nexus.
//!
//! [`RecordAccess`] is what the server calls. It sits on a [`RecordStore`],
//! implemented over PostgreSQL ([`PgRecordStore`]) and in memory
//! ([`InMemoryRecordStore`]) for runs without a database.

pub mod access;
pub mod api_key;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod presentation;
pub mod store;

pub use access::RecordAccess;
pub use api_key::{ApiKey, UNLIMITED_KEY_NAME};
pub use error::StoreError;
pub use memory::InMemoryRecordStore;
pub use postgres::PgRecordStore;
pub use presentation::{PresentationRecord, normalize_payload};
pub use store::RecordStore;
