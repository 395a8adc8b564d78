//! Asset service context
//!
//! Bundles the frozen provider registry, the host store and the event
//! channel. The query pipeline, the selection bridge and the render helpers
//! are all methods on [`AssetService`].

use std::sync::Arc;

use crate::events::AssetEvents;
use crate::registry::ProviderRegistry;
use crate::store::AttachmentStore;

/// Shared entry point to the asset core
#[derive(Clone)]
pub struct AssetService {
    pub(crate) registry: Arc<ProviderRegistry>,
    pub(crate) store: Arc<dyn AttachmentStore>,
    pub(crate) events: AssetEvents,
}

impl AssetService {
    /// Create a new asset service
    pub fn new(
        registry: Arc<ProviderRegistry>,
        store: Arc<dyn AttachmentStore>,
        events: AssetEvents,
    ) -> Self {
        Self {
            registry,
            store,
            events,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn store(&self) -> &dyn AttachmentStore {
        self.store.as_ref()
    }

    pub fn events(&self) -> &AssetEvents {
        &self.events
    }
}
