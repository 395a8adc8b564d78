//! Notifications emitted by the selection bridge

use tokio::sync::broadcast;
use tracing::trace;

use crate::item::{MediaItem, ProviderMeta};
use crate::store::LocalRecord;

/// Broadcast channel capacity
const CHANNEL_CAPACITY: usize = 256;

/// Emitted after a selection created a new local record
#[derive(Debug, Clone)]
pub struct AttachmentInserted {
    pub record: LocalRecord,
    pub item: MediaItem,
    pub provider_meta: ProviderMeta,
}

/// Fire-and-forget event fan-out
#[derive(Debug, Clone)]
pub struct AssetEvents {
    sender: broadcast::Sender<AttachmentInserted>,
}

impl Default for AssetEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event; never blocks, and no subscribers is not an error
    pub fn emit(&self, event: AttachmentInserted) {
        if self.sender.send(event).is_err() {
            trace!("no subscribers for attachment events");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AttachmentInserted> {
        self.sender.subscribe()
    }
}
