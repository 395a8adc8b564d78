use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod models;
mod providers;
mod repositories;
mod routes;
mod state;

use assets::providers::RemoteProvider;
use assets::{AssetEvents, AssetService, ProviderRegistry, RemoteClient};
use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;

use crate::{
    config::ApiConfig, providers::LocalProvider, repositories::AttachmentRepository,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let config = ApiConfig::load().context("Failed to load configuration")?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }
    run_migrations(&pool).await?;

    let attachments = AttachmentRepository::new(pool.clone());
    let registry = build_registry(&config, &attachments)?;
    info!(providers = registry.len(), "provider registry ready");

    let events = AssetEvents::new();
    spawn_event_listener(&events);

    let public_key = config
        .jwt_public_key
        .as_deref()
        .context("jwt_public_key must be configured")?;
    let jwt_key = middleware::load_decoding_key(public_key).map_err(anyhow::Error::msg)?;

    let app_state = AppState {
        db_pool: pool,
        assets: AssetService::new(Arc::new(registry), Arc::new(attachments.clone()), events),
        attachments,
        jwt_key: Arc::new(jwt_key),
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("API service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Local library first so it is the default, then remote providers in order
fn build_registry(
    config: &ApiConfig,
    attachments: &AttachmentRepository,
) -> Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();

    if config.allow_local_media {
        registry.register(Arc::new(LocalProvider::new(attachments.clone())))?;
    }

    let client = RemoteClient::new(config.http_timeout())?;
    for provider in &config.providers {
        let remote = RemoteProvider::new(provider.clone(), client.clone())
            .with_context(|| format!("Invalid provider \"{}\"", provider.id))?;
        registry.register(Arc::new(remote))?;
    }

    if registry.is_empty() {
        warn!("no media providers configured");
    }

    Ok(registry)
}

fn spawn_event_listener(events: &AssetEvents) {
    let mut receiver = events.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => info!(
                    record = %event.record.id,
                    slug = %event.record.slug,
                    provider = event.record.provider_id().unwrap_or_default(),
                    "attachment inserted"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "attachment event listener lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
