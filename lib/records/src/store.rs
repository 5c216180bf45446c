//! Record storage seam.

use crate::api_key::ApiKey;
use crate::error::StoreError;
use crate::presentation::PresentationRecord;
use async_trait::async_trait;
use nexus_core::UserId;

/// Storage for API keys and saved presentations.
///
/// Only active keys are ever returned by the key lookups.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores a new key.
    async fn insert_api_key(&self, key: &ApiKey) -> Result<(), StoreError>;

    /// Active keys of a user, oldest first.
    async fn active_keys_for_user(&self, user_id: &UserId) -> Result<Vec<ApiKey>, StoreError>;

    /// The active key with this secret, if any.
    async fn find_active_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError>;

    /// Stores a presentation.
    async fn insert_presentation(&self, record: &PresentationRecord) -> Result<(), StoreError>;

    /// Presentations of a user, newest first.
    ///
    /// Backends that cannot sort may reject this query.
    async fn presentations_newest_first(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PresentationRecord>, StoreError>;

    /// Presentations of a user in storage order.
    async fn presentations_unordered(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PresentationRecord>, StoreError>;
}
