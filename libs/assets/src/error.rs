//! Error types for the asset provider core
//!
//! Every failure the core can report is one variant of [`AssetError`]. The
//! transport boundary turns these into a `{code, message}` pair through
//! [`AssetError::code`] and the `Display` message.

use serde::Serialize;
use thiserror::Error;

use crate::store::{LocalId, StoreError};

/// Custom error type for provider, pipeline and selection operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    /// Caller lacks a required capability
    #[error("Not allowed: {0}")]
    Authorization(String),

    /// A provider id was requested that is not registered
    #[error("Provider with ID \"{0}\" not found")]
    ProviderNotFound(String),

    /// No provider id was requested and none are registered
    #[error("No provider found")]
    NoProviderConfigured,

    /// A provider's upstream call failed
    #[error("Error fetching media: {message}")]
    ProviderRequest {
        /// Upstream HTTP status, when the upstream answered at all
        status: Option<u16>,
        message: String,
    },

    /// A provider returned more items than the requested page size
    #[error(
        "Too many media items were returned by the provider ({returned} for a page size of {page_size})"
    )]
    ProviderContractViolation { page_size: u32, returned: usize },

    /// The host store rejected a record creation
    #[error("Could not create local record: {0}")]
    RecordCreation(String),

    /// Malformed input or media item
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider does not implement an optional contract
    #[error("Provider \"{provider}\" does not support {operation}")]
    Unsupported {
        provider: String,
        operation: &'static str,
    },

    /// No local record with this id
    #[error("Record {0} not found")]
    RecordNotFound(LocalId),

    /// Host store failure outside of record creation
    #[error("Store error: {0}")]
    Store(String),
}

impl AssetError {
    /// Stable machine-readable code for the transport boundary
    pub fn code(&self) -> &'static str {
        match self {
            AssetError::Authorization(_) => "authorization_error",
            AssetError::ProviderNotFound(_) => "provider_not_found",
            AssetError::NoProviderConfigured => "no_provider_configured",
            AssetError::ProviderRequest { .. } => "provider_request_error",
            AssetError::ProviderContractViolation { .. } => "provider_contract_violation",
            AssetError::RecordCreation(_) => "record_creation_error",
            AssetError::Validation(_) => "validation_error",
            AssetError::Unsupported { .. } => "unsupported",
            AssetError::RecordNotFound(_) => "record_not_found",
            AssetError::Store(_) => "store_error",
        }
    }

    /// Structured form of this error, safe to hand to a client
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
        }
    }

    pub(crate) fn request(status: Option<u16>, message: impl Into<String>) -> Self {
        AssetError::ProviderRequest {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AssetError::Validation(message.into())
    }
}

impl From<StoreError> for AssetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AssetError::RecordNotFound(id),
            other => AssetError::Store(other.to_string()),
        }
    }
}

/// `{code, message}` pair sent across the transport boundary
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Type alias for Result with AssetError
pub type AssetResult<T> = Result<T, AssetError>;
