//! API models for request and response payloads

use std::collections::BTreeMap;

use assets::{ErrorBody, LocalId, MediaCollection, MediaItem, SelectionOutcome};
use serde::{Deserialize, Serialize};

/// One page of media items
#[derive(Debug, Serialize)]
pub struct MediaPageResponse {
    pub items: Vec<MediaItem>,
    pub total_available: u64,
    pub per_page: u32,
    pub total_pages: u64,
}

impl From<MediaCollection> for MediaPageResponse {
    fn from(collection: MediaCollection) -> Self {
        Self {
            total_available: collection.total_available(),
            per_page: collection.per_page(),
            total_pages: collection.total_pages(),
            items: collection.into_vec(),
        }
    }
}

/// Outcome of a selection: local ids for imported items, errors for the rest
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub ids: BTreeMap<String, LocalId>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, ErrorBody>,
}

impl From<SelectionOutcome> for SelectionResponse {
    fn from(outcome: SelectionOutcome) -> Self {
        Self {
            ids: outcome.local_ids(),
            errors: outcome.errors(),
        }
    }
}

/// Query parameters for a resize request
#[derive(Debug, Deserialize)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    /// `true`/`false`/`1`/`0` or an anchor pair such as `left,top`
    #[serde(default)]
    pub crop: String,
}

#[derive(Debug, Serialize)]
pub struct ResizeResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assets::selection::ItemOutcome;
    use assets::AssetError;

    #[test]
    fn test_page_response_carries_pagination() {
        let items = vec![MediaItem::new("a", "image/png").unwrap()];
        let page = MediaPageResponse::from(MediaCollection::new(items, 95, 40).unwrap());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_selection_response_splits_ids_and_errors() {
        let id = LocalId::new();
        let outcome = SelectionOutcome {
            items: vec![
                ItemOutcome {
                    external_id: "a".to_string(),
                    result: Ok(id),
                    created: true,
                },
                ItemOutcome {
                    external_id: "b".to_string(),
                    result: Err(AssetError::RecordCreation("rejected".to_string())),
                    created: false,
                },
            ],
        };

        let json = serde_json::to_value(SelectionResponse::from(outcome)).unwrap();
        assert_eq!(json["ids"]["a"], id.to_string());
        assert_eq!(json["errors"]["b"]["code"], "record_creation_error");
    }
}
