//! In-process record store for local runs and tests.

use crate::api_key::ApiKey;
use crate::error::StoreError;
use crate::presentation::PresentationRecord;
use crate::store::RecordStore;
use async_trait::async_trait;
use nexus_core::UserId;
use tokio::sync::RwLock;

/// Keeps records in memory; everything is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    keys: RwLock<Vec<ApiKey>>,
    presentations: RwLock<Vec<PresentationRecord>>,
}

impl InMemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_api_key(&self, key: &ApiKey) -> Result<(), StoreError> {
        self.keys.write().await.push(key.clone());
        Ok(())
    }

    async fn active_keys_for_user(&self, user_id: &UserId) -> Result<Vec<ApiKey>, StoreError> {
        Ok(self
            .keys
            .read()
            .await
            .iter()
            .filter(|k| k.active && &k.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_active_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError> {
        Ok(self
            .keys
            .read()
            .await
            .iter()
            .find(|k| k.active && k.key == key)
            .cloned())
    }

    async fn insert_presentation(&self, record: &PresentationRecord) -> Result<(), StoreError> {
        self.presentations.write().await.push(record.clone());
        Ok(())
    }

    async fn presentations_newest_first(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PresentationRecord>, StoreError> {
        let mut records = self.presentations_unordered(user_id).await?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn presentations_unordered(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PresentationRecord>, StoreError> {
        Ok(self
            .presentations
            .read()
            .await
            .iter()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect())
    }
}
