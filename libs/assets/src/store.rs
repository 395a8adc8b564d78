//! Host persistence boundary
//!
//! The core never talks to a database directly. It reads and writes local
//! records through [`AttachmentStore`], which the host implements.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::item::ProviderMeta;

/// Secondary metadata key holding the id of the provider that owns a record
pub const PROVIDER_META_KEY: &str = "asset_provider";
/// Secondary metadata key holding the canonical source URL of a record
pub const SOURCE_URL_META_KEY: &str = "asset_source_url";
/// Secondary metadata key holding the image alt text
pub const ALT_TEXT_META_KEY: &str = "image_alt";

/// Identifier of a persisted local record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(pub Uuid);

impl LocalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LocalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Persisted size variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSize {
    pub file: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
}

/// File and size metadata of a local record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentMetadata {
    pub file: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sizes: BTreeMap<String, StoredSize>,
}

/// Fields of a record about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocalRecord {
    pub slug: String,
    pub title: String,
    pub parent_id: Option<LocalId>,
    /// User the record is created on behalf of
    pub author_id: Option<Uuid>,
    pub description: String,
    pub caption: String,
    pub mime_type: String,
    /// Canonical URL of the asset
    pub guid: String,
    pub metadata: AttachmentMetadata,
}

/// A record persisted by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
    pub id: LocalId,
    pub slug: String,
    pub title: String,
    pub parent_id: Option<LocalId>,
    pub author_id: Option<Uuid>,
    pub description: String,
    pub caption: String,
    pub mime_type: String,
    pub guid: String,
    /// Opaque provider metadata copied at creation
    pub provider_meta: ProviderMeta,
    /// Secondary key/value metadata
    pub meta: BTreeMap<String, String>,
    pub metadata: AttachmentMetadata,
    pub created_at: DateTime<Utc>,
}

impl LocalRecord {
    /// Id of the provider this record was imported from, if any
    pub fn provider_id(&self) -> Option<&str> {
        self.meta
            .get(PROVIDER_META_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Errors reported by the host store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with this slug already exists
    #[error("A record with slug \"{0}\" already exists")]
    Duplicate(String),

    /// The host refused the write
    #[error("Record rejected: {0}")]
    Rejected(String),

    /// Record does not exist
    #[error("Record {0} not found")]
    NotFound(LocalId),

    /// Storage backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Host persistence collaborator
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Find the record whose slug equals `slug`
    async fn find_by_slug(&self, slug: &str) -> Result<Option<LocalRecord>, StoreError>;

    /// Batched slug lookup; slugs without a record are absent from the map
    async fn find_by_slugs(
        &self,
        slugs: &[String],
    ) -> Result<HashMap<String, LocalRecord>, StoreError>;

    /// Create a record together with its opaque provider metadata
    ///
    /// Must report [`StoreError::Duplicate`] when the slug is taken.
    async fn create(
        &self,
        record: NewLocalRecord,
        provider_meta: &ProviderMeta,
    ) -> Result<LocalRecord, StoreError>;

    /// Attach a secondary metadata field to a record
    async fn attach_meta(&self, id: LocalId, key: &str, value: &str) -> Result<(), StoreError>;

    /// Fetch a record by id
    async fn get(&self, id: LocalId) -> Result<Option<LocalRecord>, StoreError>;
}
