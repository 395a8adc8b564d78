//! Provider registry
//!
//! Built once at startup with `&mut` access, then shared read-only behind an
//! `Arc`. Registration order is significant: the first provider registered is
//! the default.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AssetError, AssetResult};
use crate::provider::{Capabilities, Provider};

/// What the client needs to know about one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub name: String,
    pub supports: Capabilities,
}

/// Registry of providers keyed by id, in registration order
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider
    ///
    /// A second registration under the same id replaces the first in place,
    /// keeping its position.
    pub fn register(&mut self, provider: Arc<dyn Provider>) -> AssetResult<&mut Self> {
        let id = provider.id().to_string();
        if id.is_empty() {
            return Err(AssetError::Validation(
                "Provider id must not be empty".to_string(),
            ));
        }

        match self.providers.iter().position(|p| p.id() == id) {
            Some(index) => {
                warn!(provider = %id, "provider registered twice, replacing the earlier one");
                self.providers[index] = provider;
            }
            None => {
                info!(provider = %id, name = provider.name(), "registered provider");
                self.providers.push(provider);
            }
        }

        Ok(self)
    }

    /// Look up a provider; an empty id resolves to the first registered
    pub fn get(&self, id: &str) -> AssetResult<Arc<dyn Provider>> {
        if !id.is_empty() {
            return self
                .providers
                .iter()
                .find(|p| p.id() == id)
                .cloned()
                .ok_or_else(|| AssetError::ProviderNotFound(id.to_string()));
        }

        self.providers
            .first()
            .cloned()
            .ok_or(AssetError::NoProviderConfigured)
    }

    /// Same as [`get`](Self::get) with `None` meaning the default provider
    pub fn resolve(&self, id: Option<&str>) -> AssetResult<Arc<dyn Provider>> {
        self.get(id.unwrap_or_default())
    }

    /// Provider ids, capability flags and names for the client widgets
    pub fn list_for_ui(&self) -> Vec<ProviderDescriptor> {
        self.providers
            .iter()
            .map(|p| ProviderDescriptor {
                id: p.id().to_string(),
                name: p.name().to_string(),
                supports: p.capabilities(),
            })
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.id())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
