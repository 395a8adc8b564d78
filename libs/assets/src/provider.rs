//! Provider contract
//!
//! A provider is a pluggable source of media assets. The only operation every
//! provider has to implement is [`Provider::query`]; fetching a single item
//! and dynamic resizing are optional contracts exposed through
//! [`Provider::as_single`] and [`Provider::as_resizable`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::collection::MediaCollection;
use crate::error::{AssetError, AssetResult};
use crate::item::MediaItem;
use crate::query::Query;
use crate::store::LocalRecord;

/// Capability flags declared by a provider
///
/// Serialized with the keys the client-side widgets read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Capabilities {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
    pub crop: bool,
    pub dynamic_resizing: bool,
    pub filter_search: bool,
    pub filter_date: bool,
    pub filter_type: bool,
    pub filter_user: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            create: false,
            update: false,
            delete: false,
            crop: false,
            dynamic_resizing: false,
            filter_search: true,
            filter_date: true,
            filter_type: true,
            filter_user: true,
        }
    }
}

/// A pluggable source of media assets
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, unique across the registry
    fn id(&self) -> &str;

    /// Human-readable label
    fn name(&self) -> &str;

    /// Capability flags; dynamic resizing defaults to "implements [`Resizable`]"
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            dynamic_resizing: self.as_resizable().is_some(),
            ..Capabilities::default()
        }
    }

    /// Fetch one page of items matching `query`
    ///
    /// Returns an empty collection when nothing matches and must not return
    /// more than `query.page_size` items.
    async fn query(&self, query: &Query) -> AssetResult<MediaCollection>;

    /// Single-item lookup, when supported
    fn as_single(&self) -> Option<&dyn RequestSingle> {
        None
    }

    /// Dynamic resizing, when supported
    fn as_resizable(&self) -> Option<&dyn Resizable> {
        None
    }
}

impl fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

/// Fetch exactly one item by its provider-local id
#[async_trait]
pub trait RequestSingle: Send + Sync {
    async fn query_one(&self, external_id: &str) -> AssetResult<MediaItem>;
}

/// Resolve a resized rendition of a persisted asset
#[async_trait]
pub trait Resizable: Send + Sync {
    /// URL of `record` at `width` x `height`
    async fn resize(
        &self,
        record: &LocalRecord,
        width: u32,
        height: u32,
        crop: Crop,
    ) -> AssetResult<String>;
}

/// Horizontal crop anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

/// Vertical crop anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

/// How a resize should crop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crop {
    /// Scale to fit, never crop
    #[default]
    Off,
    /// Crop to the exact dimensions around the center
    On,
    /// Crop to the exact dimensions around the given anchor
    Anchored {
        x: HorizontalAnchor,
        y: VerticalAnchor,
    },
}

impl FromStr for Crop {
    type Err = AssetError;

    /// Accepts `true`/`false`/`1`/`0` or an `x,y` anchor pair such as `left,top`
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "" | "0" | "false" => return Ok(Crop::Off),
            "1" | "true" => return Ok(Crop::On),
            _ => {}
        }

        let invalid = || AssetError::Validation(format!("Invalid crop \"{value}\""));
        let (x, y) = value.split_once(',').ok_or_else(invalid)?;
        let x = match x.trim() {
            "left" => HorizontalAnchor::Left,
            "center" => HorizontalAnchor::Center,
            "right" => HorizontalAnchor::Right,
            _ => return Err(invalid()),
        };
        let y = match y.trim() {
            "top" => VerticalAnchor::Top,
            "center" => VerticalAnchor::Center,
            "bottom" => VerticalAnchor::Bottom,
            _ => return Err(invalid()),
        };
        Ok(Crop::Anchored { x, y })
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crop::Off => f.write_str("0"),
            Crop::On => f.write_str("1"),
            Crop::Anchored { x, y } => {
                let x = match x {
                    HorizontalAnchor::Left => "left",
                    HorizontalAnchor::Center => "center",
                    HorizontalAnchor::Right => "right",
                };
                let y = match y {
                    VerticalAnchor::Top => "top",
                    VerticalAnchor::Center => "center",
                    VerticalAnchor::Bottom => "bottom",
                };
                write!(f, "{x},{y}")
            }
        }
    }
}
