//! Media item model
//!
//! A [`MediaItem`] is the provider-agnostic description of one external
//! asset, before or after it has been matched to a local record.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AssetError, AssetResult};
use crate::store::LocalId;

/// Side length used for playable poster and thumbnail references
const PLAYABLE_IMAGE_SIZE: u32 = 400;

/// Scalar value carried in [`MediaItem::provider_meta`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(v) => write!(f, "{v}"),
            MetaValue::Int(v) => write!(f, "{v}"),
            MetaValue::Float(v) => write!(f, "{v}"),
            MetaValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Int(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

/// Open provider-specific metadata (bitrate, album, artist, ...)
pub type ProviderMeta = BTreeMap<String, MetaValue>;

/// One pre-computed size variant of an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeVariant {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Image reference used for playable posters and thumbnails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

impl ImageRef {
    fn square(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: PLAYABLE_IMAGE_SIZE,
            height: PLAYABLE_IMAGE_SIZE,
        }
    }
}

/// Media item model
///
/// Equality is by `id` only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaItem {
    pub id: String,
    pub provider_id: String,
    pub title: String,
    pub filename: String,
    pub mime_type: String,
    pub description: String,
    pub caption: String,
    pub alt_text: String,
    pub url: String,
    pub link: String,
    pub name: String,
    pub author_name: String,
    pub author_link: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_size_bytes: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub sizes: BTreeMap<String, SizeVariant>,
    pub provider_meta: ProviderMeta,
    pub duration: Option<String>,
    pub duration_display: Option<String>,
    pub thumbnail: Option<ImageRef>,
    pub image: Option<ImageRef>,
    pub exists_locally: bool,
    pub local_id: Option<LocalId>,
}

impl PartialEq for MediaItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MediaItem {}

fn mime_regex() -> &'static Regex {
    static MIME_REGEX: OnceLock<Regex> = OnceLock::new();
    MIME_REGEX.get_or_init(|| {
        Regex::new(r"^[^/\s]+/[^/\s]+$").expect("Failed to compile mime type regex")
    })
}

/// Validate a `type/subtype` mime string
pub fn validate_mime_type(mime_type: &str) -> AssetResult<()> {
    if mime_regex().is_match(mime_type) {
        Ok(())
    } else {
        Err(AssetError::validation(format!(
            "Invalid mime type \"{mime_type}\", expected type/subtype"
        )))
    }
}

impl MediaItem {
    /// Create a new item, rejecting an empty id or malformed mime type
    pub fn new(id: impl Into<String>, mime_type: impl Into<String>) -> AssetResult<Self> {
        let item = Self {
            id: id.into(),
            mime_type: mime_type.into(),
            ..Self::default()
        };
        item.validate()?;
        Ok(item)
    }

    /// Check the identity invariants of this item
    pub fn validate(&self) -> AssetResult<()> {
        if self.id.trim().is_empty() {
            return Err(AssetError::validation("Media item id must not be empty"));
        }
        validate_mime_type(&self.mime_type)
    }

    /// Primary type, e.g. `image` for `image/jpeg`
    pub fn primary_type(&self) -> &str {
        self.mime_type.split('/').next().unwrap_or_default()
    }

    /// Subtype, e.g. `jpeg` for `image/jpeg`
    pub fn subtype(&self) -> &str {
        self.mime_type.split('/').nth(1).unwrap_or_default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = alt_text.into();
        self
    }

    pub fn with_author(mut self, name: impl Into<String>, link: impl Into<String>) -> Self {
        self.author_name = name.into();
        self.author_link = link.into();
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_file_size(mut self, bytes: u64) -> Self {
        self.file_size_bytes = Some(bytes);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_modified_at(mut self, modified_at: DateTime<Utc>) -> Self {
        self.modified_at = Some(modified_at);
        self
    }

    /// Add a named size variant
    pub fn with_size(
        mut self,
        label: impl Into<String>,
        url: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        self.sizes.insert(
            label.into(),
            SizeVariant {
                url: url.into(),
                width,
                height,
            },
        );
        self
    }

    /// Add one provider metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.provider_meta.insert(key.into(), value.into());
        self
    }

    /// Set the playable duration and derive its display form
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        let duration = duration.into();
        self.duration_display = human_readable_duration(&duration);
        self.duration = Some(duration);
        self
    }

    pub fn with_thumbnail(mut self, src: impl Into<String>) -> Self {
        self.thumbnail = Some(ImageRef::square(src));
        self
    }

    pub fn with_image(mut self, src: impl Into<String>) -> Self {
        self.image = Some(ImageRef::square(src));
        self
    }

    /// File size rendered for display, e.g. `1.5 MB`
    pub fn human_file_size(&self) -> Option<String> {
        self.file_size_bytes.map(format_file_size)
    }
}

fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

/// Render `H:MM:SS`, `MM:SS` or plain seconds as words
pub fn human_readable_duration(duration: &str) -> Option<String> {
    let parts = duration
        .trim()
        .split(':')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    let (hours, minutes, seconds) = match parts.as_slice() {
        [s] => (s / 3600, (s % 3600) / 60, s % 60),
        [m, s] => (0, *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };

    let words: Vec<String> = [(hours, "hour"), (minutes, "minute"), (seconds, "second")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| {
            if value == 1 {
                format!("{value} {unit}")
            } else {
                format!("{value} {unit}s")
            }
        })
        .collect();

    if words.is_empty() {
        return Some("0 seconds".to_string());
    }
    Some(words.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_id() {
        let err = MediaItem::new("", "image/jpeg").unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert!(MediaItem::new("   ", "image/jpeg").is_err());
    }

    #[test]
    fn new_rejects_malformed_mime_types() {
        for mime in ["image", "image/", "/jpeg", "image/jpeg/extra", "", "image /jpeg"] {
            assert!(MediaItem::new("abc", mime).is_err(), "accepted {mime:?}");
        }
        assert!(MediaItem::new("abc", "application/vnd.ms-excel").is_ok());
    }

    #[test]
    fn equality_is_by_id() {
        let a = MediaItem::new("abc", "image/jpeg").unwrap().with_title("One");
        let b = MediaItem::new("abc", "video/mp4").unwrap().with_title("Two");
        let c = MediaItem::new("xyz", "image/jpeg").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn splits_mime_type() {
        let item = MediaItem::new("abc", "audio/mpeg").unwrap();
        assert_eq!(item.primary_type(), "audio");
        assert_eq!(item.subtype(), "mpeg");
    }

    #[test]
    fn duration_display() {
        assert_eq!(
            human_readable_duration("1:02:03").as_deref(),
            Some("1 hour, 2 minutes, 3 seconds")
        );
        assert_eq!(
            human_readable_duration("03:20").as_deref(),
            Some("3 minutes, 20 seconds")
        );
        assert_eq!(
            human_readable_duration("61").as_deref(),
            Some("1 minute, 1 second")
        );
        assert_eq!(human_readable_duration("soon"), None);

        let item = MediaItem::new("track", "audio/mpeg")
            .unwrap()
            .with_duration("4:05");
        assert_eq!(item.duration.as_deref(), Some("4:05"));
        assert_eq!(
            item.duration_display.as_deref(),
            Some("4 minutes, 5 seconds")
        );
    }

    #[test]
    fn file_size_display() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        let item = MediaItem::new("abc", "image/png").unwrap();
        assert_eq!(item.human_file_size(), None);
    }

    #[test]
    fn provider_meta_round_trips_scalars() {
        let item = MediaItem::new("abc", "audio/mpeg")
            .unwrap()
            .with_meta("album", "Blue")
            .with_meta("bitrate", 320_i64)
            .with_meta("explicit", false);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["provider_meta"]["album"], "Blue");
        assert_eq!(json["provider_meta"]["bitrate"], 320);

        let back: MediaItem = serde_json::from_value(json).unwrap();
        assert_eq!(back.provider_meta.get("bitrate"), Some(&MetaValue::Int(320)));
        assert_eq!(
            back.provider_meta.get("explicit"),
            Some(&MetaValue::Bool(false))
        );
    }
}
