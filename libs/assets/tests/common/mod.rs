//! Shared fixtures for the asset integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use assets::{
    AssetEvents, AssetResult, AssetService, AttachmentStore, Caller, Crop, LocalId, LocalRecord,
    MediaCollection, MediaItem, MemoryStore, NewLocalRecord, Provider, ProviderMeta,
    ProviderRegistry, Query, RequestSingle, Resizable, StoreError,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Caller with fixed permissions
pub struct StaticCaller {
    pub id: Option<Uuid>,
    pub upload: bool,
    pub editable: Vec<LocalId>,
}

impl StaticCaller {
    pub fn uploader() -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            upload: true,
            editable: Vec::new(),
        }
    }

    pub fn reader() -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            upload: false,
            editable: Vec::new(),
        }
    }
}

#[async_trait]
impl Caller for StaticCaller {
    fn user_id(&self) -> Option<Uuid> {
        self.id
    }

    fn can_upload_files(&self) -> bool {
        self.upload
    }

    async fn can_edit(&self, record: LocalId) -> bool {
        self.editable.contains(&record)
    }
}

/// Provider answering every query with a fixed list of items
pub struct StubProvider {
    pub id: &'static str,
    pub items: Vec<MediaItem>,
    pub total: u64,
    /// Return every item even when a smaller page size was requested
    pub overflow: bool,
    pub resizing: bool,
    pub single: bool,
    pub queries: Mutex<Vec<Query>>,
}

impl StubProvider {
    pub fn new(id: &'static str, items: Vec<MediaItem>) -> Self {
        let total = items.len() as u64;
        Self {
            id,
            items,
            total,
            overflow: false,
            resizing: false,
            single: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<Query> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        "Stub"
    }

    async fn query(&self, query: &Query) -> AssetResult<MediaCollection> {
        self.queries.lock().unwrap().push(query.clone());

        let mut items = self.items.clone();
        if let Some(size) = query.page_size {
            if !self.overflow {
                items.truncate(size as usize);
            }
        }
        if items.is_empty() {
            return Ok(MediaCollection::empty());
        }
        MediaCollection::new(items, self.total, query.page_size.unwrap_or(40))
    }

    fn as_single(&self) -> Option<&dyn RequestSingle> {
        self.single.then_some(self as &dyn RequestSingle)
    }

    fn as_resizable(&self) -> Option<&dyn Resizable> {
        self.resizing.then_some(self as &dyn Resizable)
    }
}

#[async_trait]
impl RequestSingle for StubProvider {
    async fn query_one(&self, external_id: &str) -> AssetResult<MediaItem> {
        self.items
            .iter()
            .find(|item| item.id == external_id)
            .cloned()
            .ok_or_else(|| assets::AssetError::ProviderRequest {
                status: Some(404),
                message: "404: Not Found".to_string(),
            })
    }
}

#[async_trait]
impl Resizable for StubProvider {
    async fn resize(
        &self,
        record: &LocalRecord,
        width: u32,
        height: u32,
        crop: Crop,
    ) -> AssetResult<String> {
        Ok(format!(
            "https://img.test/{}?w={width}&h={height}&crop={crop}",
            record.slug
        ))
    }
}

/// [`MemoryStore`] with lookup counters and injectable creation failures
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub batch_lookups: AtomicUsize,
    pub single_lookups: AtomicUsize,
    /// Slugs whose creation is rejected
    pub reject: HashSet<String>,
    /// Slugs created by a "concurrent" request right before ours
    pub race: HashSet<String>,
}

impl CountingStore {
    pub fn batch_lookups(&self) -> usize {
        self.batch_lookups.load(Ordering::SeqCst)
    }

    /// Persist a record for `slug` as if it had been imported earlier
    pub async fn seed(&self, slug: &str) -> LocalRecord {
        self.inner
            .create(new_record(slug), &ProviderMeta::new())
            .await
            .unwrap()
    }
}

pub fn new_record(slug: &str) -> NewLocalRecord {
    NewLocalRecord {
        slug: slug.to_string(),
        title: slug.to_string(),
        parent_id: None,
        author_id: None,
        description: String::new(),
        caption: String::new(),
        mime_type: "image/jpeg".to_string(),
        guid: format!("https://cdn.test/{slug}.jpg"),
        metadata: Default::default(),
    }
}

#[async_trait]
impl AttachmentStore for CountingStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<LocalRecord>, StoreError> {
        self.single_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_slug(slug).await
    }

    async fn find_by_slugs(
        &self,
        slugs: &[String],
    ) -> Result<HashMap<String, LocalRecord>, StoreError> {
        self.batch_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_slugs(slugs).await
    }

    async fn create(
        &self,
        record: NewLocalRecord,
        provider_meta: &ProviderMeta,
    ) -> Result<LocalRecord, StoreError> {
        if self.reject.contains(&record.slug) {
            return Err(StoreError::Rejected(format!("cannot store {}", record.slug)));
        }
        if self.race.contains(&record.slug) {
            let slug = record.slug.clone();
            self.inner.create(record, provider_meta).await?;
            return Err(StoreError::Duplicate(slug));
        }
        self.inner.create(record, provider_meta).await
    }

    async fn attach_meta(&self, id: LocalId, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.attach_meta(id, key, value).await
    }

    async fn get(&self, id: LocalId) -> Result<Option<LocalRecord>, StoreError> {
        self.inner.get(id).await
    }
}

pub fn photo(id: &str) -> MediaItem {
    MediaItem::new(id, "image/jpeg")
        .unwrap()
        .with_title(format!("Photo {id}"))
        .with_filename(format!("{id}.jpg"))
        .with_url(format!("https://cdn.test/{id}.jpg"))
        .with_dimensions(1200, 800)
}

pub fn service(providers: Vec<Arc<dyn Provider>>, store: Arc<CountingStore>) -> AssetService {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(provider).unwrap();
    }
    AssetService::new(Arc::new(registry), store, AssetEvents::new())
}
