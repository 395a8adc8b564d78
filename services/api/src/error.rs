//! Custom error types for the API service
//!
//! Every error leaves the service as `{"code": ..., "message": ...}`.

use assets::AssetError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Error reported by the asset core
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Asset(err) => match err {
                AssetError::Authorization(_) => StatusCode::FORBIDDEN,
                AssetError::ProviderNotFound(_) | AssetError::RecordNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                AssetError::NoProviderConfigured => StatusCode::SERVICE_UNAVAILABLE,
                AssetError::ProviderRequest { .. }
                | AssetError::ProviderContractViolation { .. } => StatusCode::BAD_GATEWAY,
                AssetError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AssetError::Unsupported { .. } => StatusCode::NOT_IMPLEMENTED,
                AssetError::RecordCreation(_) | AssetError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "unauthorized",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::InternalServerError => "internal_error",
            ApiError::Database(_) => "database_error",
            ApiError::Asset(err) => err.code(),
        }
    }

    /// Client-facing message; storage internals stay in the logs
    fn message(&self) -> String {
        match self {
            ApiError::Database(_) => "Database error".to_string(),
            ApiError::Asset(AssetError::Store(_)) => "Storage error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "code": self.code(),
            "message": self.message(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_asset_errors_map_to_status_and_body() {
        let (status, body) =
            render(AssetError::ProviderNotFound("dam".to_string()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "provider_not_found");
        assert_eq!(body["message"], "Provider with ID \"dam\" not found");

        let (status, body) = render(
            AssetError::ProviderContractViolation {
                page_size: 2,
                returned: 3,
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "provider_contract_violation");

        let (status, _) = render(AssetError::Authorization("no".to_string()).into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = render(AssetError::Validation("page".to_string()).into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_store_details_are_hidden() {
        let (status, body) = render(
            AssetError::Store("connection reset by 10.0.0.3".to_string()).into(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "store_error");
        assert_eq!(body["message"], "Storage error");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (status, body) = render(ApiError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");
    }
}
