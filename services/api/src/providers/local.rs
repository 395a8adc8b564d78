//! The host's own media library exposed as a provider

use assets::collection::DEFAULT_PER_PAGE;
use assets::store::ALT_TEXT_META_KEY;
use assets::{AssetResult, Capabilities, LocalRecord, MediaCollection, MediaItem, Provider, Query};
use async_trait::async_trait;

use crate::repositories::AttachmentRepository;

/// Provider id of the local library
pub const LOCAL_PROVIDER_ID: &str = "local";

/// Answers queries from the attachments table
#[derive(Clone)]
pub struct LocalProvider {
    repository: AttachmentRepository,
}

impl LocalProvider {
    pub fn new(repository: AttachmentRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Provider for LocalProvider {
    fn id(&self) -> &str {
        LOCAL_PROVIDER_ID
    }

    fn name(&self) -> &str {
        "Local Media"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            create: true,
            update: true,
            delete: true,
            // Author ids are host-side integers, records store uuids
            filter_user: false,
            ..Capabilities::default()
        }
    }

    async fn query(&self, query: &Query) -> AssetResult<MediaCollection> {
        let per_page = query.page_size.unwrap_or(DEFAULT_PER_PAGE);
        let (records, total) = self.repository.list(query, per_page).await?;
        if records.is_empty() {
            return Ok(MediaCollection::empty());
        }

        let items = records.iter().map(record_to_item).collect();
        MediaCollection::new(items, total.max(0) as u64, per_page)
    }
}

/// Describe a stored record as a media item
fn record_to_item(record: &LocalRecord) -> MediaItem {
    let mut item = MediaItem {
        id: record.id.to_string(),
        title: record.title.clone(),
        filename: record.metadata.file.clone(),
        mime_type: record.mime_type.clone(),
        description: record.description.clone(),
        caption: record.caption.clone(),
        alt_text: record.meta.get(ALT_TEXT_META_KEY).cloned().unwrap_or_default(),
        url: record.guid.clone(),
        width: record.metadata.width,
        height: record.metadata.height,
        created_at: Some(record.created_at),
        provider_meta: record.provider_meta.clone(),
        exists_locally: true,
        local_id: Some(record.id),
        ..MediaItem::default()
    };

    for (label, size) in &record.metadata.sizes {
        item = item.with_size(label.clone(), size.file.clone(), size.width, size.height);
    }

    item
}
