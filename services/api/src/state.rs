//! Application state shared across handlers

use std::sync::Arc;

use assets::AssetService;
use jsonwebtoken::DecodingKey;
use sqlx::PgPool;

use crate::repositories::AttachmentRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub attachments: AttachmentRepository,
    pub assets: AssetService,
    /// RS256 key bearer tokens are verified with
    pub jwt_key: Arc<DecodingKey>,
}
