//! Pluggable media asset providers
//!
//! External media sources (stock libraries, digital asset managers, video
//! platforms) are exposed through one [`Provider`] contract. Queries from the
//! media browser run through the [`AssetService`] pipeline, which normalizes
//! arguments, delegates to the selected provider and reconciles the answer
//! with records the host already stores. Selected items are imported as local
//! records by the selection bridge, idempotently.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use assets::{AssetEvents, AssetService, MemoryStore, ProviderRegistry};
//!
//! let mut registry = ProviderRegistry::new();
//! // registry.register(Arc::new(my_provider))?;
//! let service = AssetService::new(
//!     Arc::new(registry),
//!     Arc::new(MemoryStore::new()),
//!     AssetEvents::new(),
//! );
//! ```

pub mod access;
pub mod collection;
pub mod error;
pub mod events;
pub mod http;
pub mod item;
pub mod memory;
pub mod pipeline;
pub mod provider;
pub mod providers;
pub mod query;
pub mod registry;
pub mod render;
pub mod selection;
pub mod service;
pub mod store;

pub use access::Caller;
pub use collection::MediaCollection;
pub use error::{AssetError, AssetResult, ErrorBody};
pub use events::{AssetEvents, AttachmentInserted};
pub use http::RemoteClient;
pub use item::{MediaItem, MetaValue, ProviderMeta, SizeVariant};
pub use memory::MemoryStore;
pub use pipeline::QueryRequest;
pub use provider::{Capabilities, Crop, Provider, RequestSingle, Resizable};
pub use query::{MimeFilter, OrderDirection, Query, RawQuery};
pub use registry::{ProviderDescriptor, ProviderRegistry};
pub use render::AttachmentView;
pub use selection::{SelectionOutcome, SelectionRequest};
pub use service::AssetService;
pub use store::{
    AttachmentMetadata, AttachmentStore, LocalId, LocalRecord, NewLocalRecord, StoreError,
};
