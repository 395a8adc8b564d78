//! Selection bridge
//!
//! Turns a confirmed selection into local records. Re-selecting an item that
//! was imported before is a no-op returning the existing record. Items are
//! handled one by one in the given order, and a failure is reported for that
//! item only.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::access::{Caller, authorize};
use crate::error::{AssetError, AssetResult, ErrorBody};
use crate::events::AttachmentInserted;
use crate::item::MediaItem;
use crate::service::AssetService;
use crate::store::{
    ALT_TEXT_META_KEY, AttachmentMetadata, LocalId, LocalRecord, NewLocalRecord,
    PROVIDER_META_KEY, SOURCE_URL_META_KEY, StoreError, StoredSize,
};

/// Inbound selection operation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectionRequest {
    /// Provider id; the default provider when absent
    pub provider: Option<String>,
    /// Record the selection is attached to
    pub parent: Option<LocalId>,
    pub selection: Vec<MediaItem>,
}

/// Result of importing one selected item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub external_id: String,
    pub result: Result<LocalId, AssetError>,
    /// Whether this call created the record
    pub created: bool,
}

/// Per-item results of a selection, in selection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionOutcome {
    pub items: Vec<ItemOutcome>,
}

impl SelectionOutcome {
    /// External id to local id for every item that succeeded
    pub fn local_ids(&self) -> BTreeMap<String, LocalId> {
        self.items
            .iter()
            .filter_map(|outcome| {
                outcome
                    .result
                    .as_ref()
                    .ok()
                    .map(|id| (outcome.external_id.clone(), *id))
            })
            .collect()
    }

    /// External id to error for every item that failed
    pub fn errors(&self) -> BTreeMap<String, ErrorBody> {
        self.items
            .iter()
            .filter_map(|outcome| {
                outcome
                    .result
                    .as_ref()
                    .err()
                    .map(|err| (outcome.external_id.clone(), err.to_body()))
            })
            .collect()
    }

    pub fn local_id(&self, external_id: &str) -> Option<LocalId> {
        self.items
            .iter()
            .find(|outcome| outcome.external_id == external_id)
            .and_then(|outcome| outcome.result.as_ref().ok().copied())
    }

    pub fn created_count(&self) -> usize {
        self.items.iter().filter(|outcome| outcome.created).count()
    }
}

impl AssetService {
    /// Import a selection of provider items as local records
    ///
    /// Authorization and provider resolution fail the whole request; anything
    /// after that is reported per item.
    pub async fn handle_selection(
        &self,
        caller: &dyn Caller,
        request: SelectionRequest,
    ) -> AssetResult<SelectionOutcome> {
        authorize(caller, request.parent).await?;

        let provider = self.registry.resolve(request.provider.as_deref())?;
        let target = ImportTarget {
            provider_id: provider.id(),
            dynamic_resizing: provider.capabilities().dynamic_resizing,
            parent: request.parent,
            author: caller.user_id(),
        };

        let mut outcome = SelectionOutcome {
            items: Vec::with_capacity(request.selection.len()),
        };

        for item in request.selection {
            let external_id = item.id.clone();
            let result = self.import_item(&target, item).await;

            let (result, created) = match result {
                Ok((id, created)) => (Ok(id), created),
                Err(err) => {
                    error!(
                        provider = provider.id(),
                        item = %external_id,
                        error = %err,
                        "failed to import item"
                    );
                    (Err(err), false)
                }
            };

            outcome.items.push(ItemOutcome {
                external_id,
                result,
                created,
            });
        }

        info!(
            provider = provider.id(),
            selected = outcome.items.len(),
            created = outcome.created_count(),
            "handled selection"
        );

        Ok(outcome)
    }

    async fn import_item(
        &self,
        target: &ImportTarget<'_>,
        mut item: MediaItem,
    ) -> AssetResult<(LocalId, bool)> {
        item.validate()?;

        // Reconciled items carry the local id in place of the provider id.
        if let Some(local_id) = item.local_id {
            return match self.store.get(local_id).await? {
                Some(existing) => {
                    debug!(local = %existing.id, "item is already a local record");
                    Ok((existing.id, false))
                }
                None => Err(AssetError::RecordNotFound(local_id)),
            };
        }

        if let Some(existing) = self.store.find_by_slug(&item.id).await? {
            debug!(item = %item.id, local = %existing.id, "item already imported");
            return Ok((existing.id, false));
        }

        let new_record = NewLocalRecord {
            slug: item.id.clone(),
            title: item.title.clone(),
            parent_id: target.parent,
            author_id: target.author,
            description: item.description.clone(),
            caption: item.caption.clone(),
            mime_type: item.mime_type.clone(),
            guid: item.url.clone(),
            metadata: attachment_metadata(&item, target.dynamic_resizing),
        };

        let mut record = match self.store.create(new_record, &item.provider_meta).await {
            Ok(record) => record,
            Err(StoreError::Duplicate(_)) => {
                // Lost a race with a concurrent import of the same item.
                return match self.store.find_by_slug(&item.id).await? {
                    Some(existing) => Ok((existing.id, false)),
                    None => Err(AssetError::RecordCreation(format!(
                        "store reported a duplicate for \"{}\" but no record exists",
                        item.id
                    ))),
                };
            }
            Err(err) => return Err(AssetError::RecordCreation(err.to_string())),
        };

        if !item.alt_text.is_empty() {
            self.attach(&mut record, ALT_TEXT_META_KEY, &item.alt_text)
                .await?;
        }
        self.attach(&mut record, SOURCE_URL_META_KEY, &item.url)
            .await?;
        self.attach(&mut record, PROVIDER_META_KEY, target.provider_id)
            .await?;

        let id = record.id;
        let provider_meta = std::mem::take(&mut item.provider_meta);
        self.events.emit(AttachmentInserted {
            record,
            item,
            provider_meta,
        });

        Ok((id, true))
    }

    async fn attach(&self, record: &mut LocalRecord, key: &str, value: &str) -> AssetResult<()> {
        self.store.attach_meta(record.id, key, value).await?;
        record.meta.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Where and for whom a selection is imported
struct ImportTarget<'a> {
    provider_id: &'a str,
    dynamic_resizing: bool,
    parent: Option<LocalId>,
    author: Option<Uuid>,
}

/// File and size metadata persisted for a newly imported item
///
/// Size variants are stored verbatim unless the provider resizes on demand.
fn attachment_metadata(item: &MediaItem, dynamic_resizing: bool) -> AttachmentMetadata {
    let sizes = if dynamic_resizing {
        BTreeMap::new()
    } else {
        item.sizes
            .iter()
            .map(|(label, size)| {
                (
                    label.clone(),
                    StoredSize {
                        file: size.url.clone(),
                        width: size.width,
                        height: size.height,
                        mime_type: item.mime_type.clone(),
                    },
                )
            })
            .collect()
    };

    AttachmentMetadata {
        file: item.filename.clone(),
        width: item.width,
        height: item.height,
        sizes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> MediaItem {
        MediaItem::new("abc", "image/jpeg")
            .unwrap()
            .with_filename("abc.jpg")
            .with_dimensions(1200, 800)
            .with_size("thumbnail", "https://cdn.test/abc-150.jpg", 150, 150)
    }

    #[test]
    fn sizes_are_kept_verbatim_without_dynamic_resizing() {
        let metadata = attachment_metadata(&photo(), false);
        assert_eq!(metadata.file, "abc.jpg");
        assert_eq!(metadata.width, Some(1200));
        assert_eq!(
            metadata.sizes.get("thumbnail"),
            Some(&StoredSize {
                file: "https://cdn.test/abc-150.jpg".to_string(),
                width: 150,
                height: 150,
                mime_type: "image/jpeg".to_string(),
            })
        );
    }

    #[test]
    fn sizes_are_omitted_with_dynamic_resizing() {
        let metadata = attachment_metadata(&photo(), true);
        assert!(metadata.sizes.is_empty());
        assert_eq!(metadata.height, Some(800));
    }
}
