//! API service routes

use assets::{Crop, LocalId, QueryRequest, SelectionRequest};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    middleware::{AuthUser, RequestCaller, auth_middleware},
    models::{MediaPageResponse, ResizeParams, ResizeResponse, SelectionResponse},
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/providers", get(list_providers))
        .route("/media/query", post(query_media))
        .route("/media/select", post(select_media))
        .route("/media/:provider/:external_id", get(get_media_item))
        .route("/attachments/:id", get(get_attachment))
        .route("/attachments/:id/resize", get(resize_attachment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "service": "api-service",
        "database": database,
    }))
}

/// Registered providers with their capability flags
pub async fn list_providers(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.assets.registry().list_for_ui())
}

/// Run a query through the provider pipeline
pub async fn query_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<MediaPageResponse>> {
    let caller = RequestCaller::new(&user, &state.attachments);
    let collection = state.assets.request_items(&caller, request).await?;

    Ok(Json(collection.into()))
}

/// Fetch one item from a provider
pub async fn get_media_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((provider, external_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let caller = RequestCaller::new(&user, &state.attachments);
    let item = state
        .assets
        .request_item(&caller, Some(&provider), &external_id)
        .await?;

    Ok(Json(item))
}

/// Import selected provider items as local records
pub async fn select_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SelectionRequest>,
) -> ApiResult<Json<SelectionResponse>> {
    let caller = RequestCaller::new(&user, &state.attachments);
    let outcome = state.assets.handle_selection(&caller, request).await?;

    Ok(Json(outcome.into()))
}

/// A local record with its resolved URL and sizes
pub async fn get_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let view = state.assets.attachment_view(LocalId(id)).await?;

    Ok(Json(view))
}

/// Resized URL of an imported record
pub async fn resize_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ResizeParams>,
) -> ApiResult<Json<ResizeResponse>> {
    let crop: Crop = params.crop.parse()?;
    let url = state
        .assets
        .resize_record(LocalId(id), params.width, params.height, crop)
        .await?;

    Ok(Json(ResizeResponse { url }))
}
