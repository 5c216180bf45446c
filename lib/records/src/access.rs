//! Key and presentation operations used by the server.

use crate::api_key::ApiKey;
use crate::error::StoreError;
use crate::presentation::PresentationRecord;
use crate::store::RecordStore;
use nexus_core::UserId;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Thin operations over a [`RecordStore`].
#[derive(Clone)]
pub struct RecordAccess {
    store: Arc<dyn RecordStore>,
}

impl RecordAccess {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Issues and stores a new key, returning the secret.
    ///
    /// Keys are random; no uniqueness check is made.
    #[instrument(skip(self, name))]
    pub async fn generate_api_key(&self, user_id: &UserId, name: &str) -> Result<String, StoreError> {
        let key = ApiKey::issue(user_id.clone(), name);
        self.store.insert_api_key(&key).await?;
        debug!(key_id = %key.id, "issued api key");
        Ok(key.key)
    }

    /// Active keys of a user; empty when there are none.
    pub async fn user_keys(&self, user_id: &UserId) -> Result<Vec<ApiKey>, StoreError> {
        self.store.active_keys_for_user(user_id).await
    }

    /// Returns true if `key` is an active key.
    pub async fn validate_api_key(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.store.find_active_key(key).await?.is_some())
    }

    /// Details of an active key.
    pub async fn api_key_details(&self, key: &str) -> Result<Option<ApiKey>, StoreError> {
        self.store.find_active_key(key).await
    }

    /// Presentations of a user, newest first when the store can sort.
    ///
    /// A rejected ordered query falls back to the unordered listing.
    #[instrument(skip(self))]
    pub async fn user_presentations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PresentationRecord>, StoreError> {
        match self.store.presentations_newest_first(user_id).await {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(error = %e, "ordered presentation query failed; listing unordered");
                self.store.presentations_unordered(user_id).await
            }
        }
    }

    /// Saves a deck; a one-element array payload is stored as its element.
    #[instrument(skip(self, data))]
    pub async fn save_presentation(
        &self,
        user_id: &UserId,
        data: Value,
    ) -> Result<PresentationRecord, StoreError> {
        let record = PresentationRecord::new(user_id.clone(), data);
        self.store.insert_presentation(&record).await?;
        Ok(record)
    }
}
