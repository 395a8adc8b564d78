//! Ordered media collections with pagination metadata

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{AssetError, AssetResult};
use crate::item::MediaItem;

/// Page size assumed when a provider does not report one
pub const DEFAULT_PER_PAGE: u32 = 40;

/// An ordered page of media items as returned by one provider
///
/// Order is the provider's ranking and is preserved through reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct MediaCollection {
    items: Vec<MediaItem>,
    total_available: u64,
    per_page: u32,
}

impl MediaCollection {
    /// Create a collection, validating every item and the page size
    pub fn new(items: Vec<MediaItem>, total_available: u64, per_page: u32) -> AssetResult<Self> {
        if per_page == 0 {
            return Err(AssetError::validation("per_page must be greater than zero"));
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            item.validate()?;
            if !seen.insert(item.id.as_str()) {
                return Err(AssetError::validation(format!(
                    "Duplicate media item id \"{}\" in collection",
                    item.id
                )));
            }
        }

        Ok(Self {
            items,
            total_available,
            per_page,
        })
    }

    /// Collection whose total is its own length, with the default page size
    pub fn from_items(items: Vec<MediaItem>) -> AssetResult<Self> {
        let total = items.len() as u64;
        Self::new(items, total, DEFAULT_PER_PAGE)
    }

    /// Empty collection, the normal answer for "no matches"
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_available: 0,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_available(&self) -> u64 {
        self.total_available
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// `ceil(total_available / per_page)`
    pub fn total_pages(&self) -> u64 {
        self.total_available.div_ceil(u64::from(self.per_page))
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaItem> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, MediaItem> {
        self.items.iter_mut()
    }

    /// Plain ordered list for serialization
    pub fn into_vec(self) -> Vec<MediaItem> {
        self.items
    }
}

impl IntoIterator for MediaCollection {
    type Item = MediaItem;
    type IntoIter = std::vec::IntoIter<MediaItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a MediaCollection {
    type Item = &'a MediaItem;
    type IntoIter = std::slice::Iter<'a, MediaItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
