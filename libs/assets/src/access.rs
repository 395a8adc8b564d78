//! Caller capability checks

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AssetError, AssetResult};
use crate::store::LocalId;

/// The identity on whose behalf a request runs
///
/// Implemented by the host, which owns users and permissions.
#[async_trait]
pub trait Caller: Send + Sync {
    /// Host user id, recorded as the author of imported records
    fn user_id(&self) -> Option<Uuid>;

    /// Whether the caller may bring new files into the library
    fn can_upload_files(&self) -> bool;

    /// Whether the caller may edit the given local record
    async fn can_edit(&self, record: LocalId) -> bool;
}

/// Require "upload files", plus "edit" on `parent` when one is given
pub async fn authorize(caller: &dyn Caller, parent: Option<LocalId>) -> AssetResult<()> {
    if !caller.can_upload_files() {
        return Err(AssetError::Authorization(
            "caller may not upload files".to_string(),
        ));
    }

    if let Some(parent) = parent {
        if !caller.can_edit(parent).await {
            return Err(AssetError::Authorization(format!(
                "caller may not edit record {parent}"
            )));
        }
    }

    Ok(())
}
