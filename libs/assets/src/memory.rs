//! In-memory [`AttachmentStore`] for tests and embedding without a database

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::item::ProviderMeta;
use crate::store::{AttachmentStore, LocalId, LocalRecord, NewLocalRecord, StoreError};

/// Records kept in a map, with a unique slug index
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<LocalId, LocalRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AttachmentStore for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<LocalRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.values().find(|r| r.slug == slug).cloned())
    }

    async fn find_by_slugs(
        &self,
        slugs: &[String],
    ) -> Result<HashMap<String, LocalRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| slugs.contains(&r.slug))
            .map(|r| (r.slug.clone(), r.clone()))
            .collect())
    }

    async fn create(
        &self,
        record: NewLocalRecord,
        provider_meta: &ProviderMeta,
    ) -> Result<LocalRecord, StoreError> {
        let mut records = self.records.write().await;
        if records.values().any(|r| r.slug == record.slug) {
            return Err(StoreError::Duplicate(record.slug));
        }

        let created = LocalRecord {
            id: LocalId::new(),
            slug: record.slug,
            title: record.title,
            parent_id: record.parent_id,
            author_id: record.author_id,
            description: record.description,
            caption: record.caption,
            mime_type: record.mime_type,
            guid: record.guid,
            provider_meta: provider_meta.clone(),
            meta: Default::default(),
            metadata: record.metadata,
            created_at: Utc::now(),
        };
        records.insert(created.id, created.clone());
        Ok(created)
    }

    async fn attach_meta(&self, id: LocalId, key: &str, value: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.meta.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, id: LocalId) -> Result<Option<LocalRecord>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }
}
