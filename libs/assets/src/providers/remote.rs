//! Configuration-driven provider backed by an HTTP endpoint
//!
//! The endpoint receives the normalized query as URL parameters and answers
//! with `{ "total": n, "per_page": n?, "items": [...] }`.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::collection::{DEFAULT_PER_PAGE, MediaCollection};
use crate::error::{AssetError, AssetResult};
use crate::http::RemoteClient;
use crate::item::MediaItem;
use crate::provider::{Capabilities, Crop, Provider, RequestSingle, Resizable};
use crate::query::Query;
use crate::render::source_url;
use crate::store::LocalRecord;

/// Definition of one remote provider
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteProviderConfig {
    pub id: String,
    pub name: String,
    /// Collection endpoint
    pub endpoint: String,
    /// Base URL for single-item lookups, `GET {item_endpoint}/{id}`
    #[serde(default)]
    pub item_endpoint: Option<String>,
    /// Image service that resizes a source URL on demand
    #[serde(default)]
    pub resize_endpoint: Option<String>,
    #[serde(default)]
    pub supports: Capabilities,
}

#[derive(Debug, Deserialize)]
struct RemotePage {
    total: u64,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    items: Vec<MediaItem>,
}

/// Provider speaking the normalized wire format over HTTP
#[derive(Debug, Clone)]
pub struct RemoteProvider {
    config: RemoteProviderConfig,
    client: RemoteClient,
}

impl RemoteProvider {
    /// Create a provider, checking its endpoints up front
    pub fn new(config: RemoteProviderConfig, client: RemoteClient) -> AssetResult<Self> {
        parse_url(&config.endpoint)?;
        if let Some(item_endpoint) = &config.item_endpoint {
            parse_url(item_endpoint)?;
        }
        if let Some(resize_endpoint) = &config.resize_endpoint {
            parse_url(resize_endpoint)?;
        }
        Ok(Self { config, client })
    }

    /// Upstream answered 2xx with items the core cannot accept
    fn malformed(&self, err: AssetError) -> AssetError {
        AssetError::request(
            None,
            format!("Malformed response from \"{}\": {err}", self.config.id),
        )
    }
}

#[async_trait]
impl Provider for RemoteProvider {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            dynamic_resizing: self.config.resize_endpoint.is_some(),
            ..self.config.supports
        }
    }

    async fn query(&self, query: &Query) -> AssetResult<MediaCollection> {
        let params = query.to_params();
        debug!(provider = %self.config.id, params = params.len(), "querying remote endpoint");

        let page: RemotePage = self.client.get_json(&self.config.endpoint, &params).await?;
        if page.items.is_empty() {
            return Ok(MediaCollection::empty());
        }

        let per_page = page
            .per_page
            .or(query.page_size)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PER_PAGE);
        MediaCollection::new(page.items, page.total, per_page)
            .map_err(|e| self.malformed(e))
    }

    fn as_single(&self) -> Option<&dyn RequestSingle> {
        self.config.item_endpoint.as_ref().map(|_| self as &dyn RequestSingle)
    }

    fn as_resizable(&self) -> Option<&dyn Resizable> {
        self.config.resize_endpoint.as_ref().map(|_| self as &dyn Resizable)
    }
}

#[async_trait]
impl RequestSingle for RemoteProvider {
    async fn query_one(&self, external_id: &str) -> AssetResult<MediaItem> {
        let base = self.config.item_endpoint.as_deref().ok_or_else(|| {
            AssetError::Unsupported {
                provider: self.config.id.clone(),
                operation: "single item requests",
            }
        })?;

        let mut url = parse_url(base)?;
        url.path_segments_mut()
            .map_err(|_| AssetError::validation(format!("Invalid item endpoint \"{base}\"")))?
            .pop_if_empty()
            .push(external_id);

        let item: MediaItem = self.client.get_json(url.as_str(), &[]).await?;
        item.validate().map_err(|e| self.malformed(e))?;
        Ok(item)
    }
}

#[async_trait]
impl Resizable for RemoteProvider {
    async fn resize(
        &self,
        record: &LocalRecord,
        width: u32,
        height: u32,
        crop: Crop,
    ) -> AssetResult<String> {
        let endpoint = self.config.resize_endpoint.as_deref().ok_or_else(|| {
            AssetError::Unsupported {
                provider: self.config.id.clone(),
                operation: "dynamic resizing",
            }
        })?;

        let src = source_url(record).unwrap_or(&record.guid);
        let url = Url::parse_with_params(
            endpoint,
            &[
                ("src", src.to_string()),
                ("w", width.to_string()),
                ("h", height.to_string()),
                ("crop", crop.to_string()),
            ],
        )
        .map_err(|e| AssetError::validation(format!("Invalid resize endpoint: {e}")))?;

        Ok(url.into())
    }
}

fn parse_url(url: &str) -> AssetResult<Url> {
    Url::parse(url).map_err(|e| AssetError::validation(format!("Invalid URL \"{url}\": {e}")))
}
