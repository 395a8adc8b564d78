//! Read-side helpers for imported records
//!
//! Records imported from a provider carry the provider id and source URL as
//! secondary metadata. These helpers use that stamp to resolve URLs, fill in
//! missing sizes and dispatch resize requests back to the owning provider.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::{AssetError, AssetResult};
use crate::provider::{Crop, Provider};
use crate::service::AssetService;
use crate::store::{AttachmentMetadata, LocalId, LocalRecord, SOURCE_URL_META_KEY, StoredSize};

/// Named sizes a host expects every image to have
pub const DEFAULT_SIZE_NAMES: [&str; 4] = ["thumbnail", "medium", "medium_large", "large"];

/// Whether the record was imported from a provider
pub fn is_provider_asset(record: &LocalRecord) -> bool {
    record.provider_id().is_some()
}

/// Stamped source URL of a provider asset
pub fn source_url(record: &LocalRecord) -> Option<&str> {
    if !is_provider_asset(record) {
        return None;
    }
    record
        .meta
        .get(SOURCE_URL_META_KEY)
        .map(String::as_str)
        .filter(|url| !url.is_empty())
}

/// Keep the last absolute URL in `url`
///
/// Hosts sometimes prepend their own upload base to an already absolute
/// provider URL, producing `https://host/uploads/https://cdn/...`.
pub fn strip_host_prefix(url: &str) -> Option<&str> {
    ["https://", "http://"]
        .iter()
        .filter_map(|scheme| url.rfind(scheme))
        .max()
        .map(|start| &url[start..])
}

/// Fill named sizes missing from an imported image's metadata
///
/// Uses the `full` size when present, otherwise one built from the source URL
/// and the main dimensions. Other records are returned unchanged.
pub fn with_fallback_sizes(
    record: &LocalRecord,
    mut metadata: AttachmentMetadata,
    size_names: &[&str],
) -> AttachmentMetadata {
    if !is_provider_asset(record) || !record.is_image() {
        return metadata;
    }

    let fallback = metadata
        .sizes
        .get("full")
        .cloned()
        .unwrap_or_else(|| StoredSize {
            file: source_url(record).unwrap_or(&record.guid).to_string(),
            width: metadata.width.unwrap_or_default(),
            height: metadata.height.unwrap_or_default(),
            mime_type: record.mime_type.clone(),
        });

    for name in size_names {
        metadata
            .sizes
            .entry((*name).to_string())
            .or_insert_with(|| fallback.clone());
    }

    metadata
}

/// A record as presented to renderers
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentView {
    pub record: LocalRecord,
    pub url: String,
    /// Name of the owning provider, when it is still registered
    pub provider: Option<String>,
    pub metadata: AttachmentMetadata,
}

impl AssetService {
    /// Provider that stamped `record`, if it is still registered
    pub fn asset_provider(&self, record: &LocalRecord) -> Option<Arc<dyn Provider>> {
        let provider_id = record.provider_id()?;
        match self.registry.get(provider_id) {
            Ok(provider) => Some(provider),
            Err(err) => {
                warn!(
                    record = %record.id,
                    provider = provider_id,
                    error = %err,
                    "asset provider is not registered"
                );
                None
            }
        }
    }

    /// Load a record with its resolved URL and complete size metadata
    pub async fn attachment_view(&self, id: LocalId) -> AssetResult<AttachmentView> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or(AssetError::RecordNotFound(id))?;

        let raw_url = source_url(&record).unwrap_or(&record.guid);
        let url = strip_host_prefix(raw_url).unwrap_or(raw_url).to_string();
        let metadata = with_fallback_sizes(&record, record.metadata.clone(), &DEFAULT_SIZE_NAMES);
        let provider = self
            .asset_provider(&record)
            .map(|provider| provider.name().to_string());

        Ok(AttachmentView {
            record,
            url,
            provider,
            metadata,
        })
    }

    /// Ask the provider that owns a record for a resized URL
    pub async fn resize_record(
        &self,
        id: LocalId,
        width: u32,
        height: u32,
        crop: Crop,
    ) -> AssetResult<String> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or(AssetError::RecordNotFound(id))?;

        let provider_id = record.provider_id().ok_or_else(|| {
            AssetError::Validation(format!("Record {id} was not imported from a provider"))
        })?;
        let provider = self.registry.get(provider_id)?;
        let resizable = provider
            .as_resizable()
            .ok_or_else(|| AssetError::Unsupported {
                provider: provider.id().to_string(),
                operation: "dynamic resizing",
            })?;

        resizable.resize(&record, width, height, crop).await
    }
}
