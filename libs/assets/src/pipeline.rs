//! Query pipeline
//!
//! Every query, whichever provider answers it, goes through the same steps:
//! authorize, normalize, resolve the provider, delegate, enforce the page
//! size, reconcile with local records.

use serde::Deserialize;
use tracing::debug;

use crate::access::{Caller, authorize};
use crate::collection::MediaCollection;
use crate::error::{AssetError, AssetResult};
use crate::item::MediaItem;
use crate::query::{Query, RawQuery};
use crate::service::AssetService;
use crate::store::{AttachmentStore, LocalId};

/// Inbound query operation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    /// Provider id; the default provider when absent
    pub provider: Option<String>,
    /// Record the caller is attaching media to
    pub parent: Option<LocalId>,
    pub query: RawQuery,
}

impl AssetService {
    /// Run a query through the provider pipeline
    pub async fn request_items(
        &self,
        caller: &dyn Caller,
        request: QueryRequest,
    ) -> AssetResult<MediaCollection> {
        authorize(caller, request.parent).await?;

        let query = Query::from_raw(&request.query)?;
        let provider = self.registry.resolve(request.provider.as_deref())?;

        debug!(provider = provider.id(), page = query.page, "querying provider");
        let mut collection = provider.query(&query).await?;

        if collection.is_empty() {
            return Ok(collection);
        }

        if let Some(page_size) = query.page_size {
            if collection.len() > page_size as usize {
                return Err(AssetError::ProviderContractViolation {
                    page_size,
                    returned: collection.len(),
                });
            }
        }

        reconcile(self.store.as_ref(), provider.id(), collection.iter_mut()).await?;
        Ok(collection)
    }

    /// Fetch one item through a provider's single-item contract
    pub async fn request_item(
        &self,
        caller: &dyn Caller,
        provider: Option<&str>,
        external_id: &str,
    ) -> AssetResult<MediaItem> {
        authorize(caller, None).await?;

        let provider = self.registry.resolve(provider)?;
        let single = provider
            .as_single()
            .ok_or_else(|| AssetError::Unsupported {
                provider: provider.id().to_string(),
                operation: "single item requests",
            })?;

        let mut item = single.query_one(external_id).await?;
        item.validate()?;

        if let Some(record) = self.store.find_by_slug(&item.id).await? {
            item.id = record.id.to_string();
            item.local_id = Some(record.id);
            item.exists_locally = true;
        }
        item.provider_id = provider.id().to_string();

        Ok(item)
    }
}

/// Match items to local records by slug with one batched lookup
///
/// Matched items take the local id and are flagged as existing locally.
/// Every item is stamped with `provider_id`.
pub(crate) async fn reconcile<'a>(
    store: &dyn AttachmentStore,
    provider_id: &str,
    items: impl Iterator<Item = &'a mut MediaItem>,
) -> AssetResult<()> {
    let items: Vec<&mut MediaItem> = items.collect();
    let slugs: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
    let existing = store.find_by_slugs(&slugs).await?;

    debug!(
        provider = provider_id,
        items = items.len(),
        matched = existing.len(),
        "reconciled provider items"
    );

    for item in items {
        if let Some(record) = existing.get(&item.id) {
            item.id = record.id.to_string();
            item.local_id = Some(record.id);
            item.exists_locally = true;
        }
        item.provider_id = provider_id.to_string();
    }

    Ok(())
}
