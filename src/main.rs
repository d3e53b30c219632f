// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use channel_booster::api::{self, AppState};
use channel_booster::config::Config;
use channel_booster::db::init_database;
use channel_booster::metrics;
use channel_booster::notifications::NotificationBus;
use channel_booster::seed::seed_channels;
use channel_booster::store::{MemoryStore, PgStore, SessionStore};
use channel_booster::video_source::{FallbackVideoSource, ResolverSettings, YouTubeApi};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,channel_booster=debug".into()),
    );
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    info!("Initialized configuration");

    // Pick the store
    let store: Arc<dyn SessionStore> = match &config.database.url {
        Some(url) => {
            let db = Arc::new(init_database(&config.database, url).await?);
            info!("Connected to database");
            Arc::new(PgStore::new(db))
        }
        None => {
            warn!("DATABASE_URL is not set, keeping all state in memory");
            Arc::new(MemoryStore::new())
        }
    };

    seed_channels(store.as_ref()).await?;
    metrics::init();

    // Video source
    if config.video_source.api_key.is_none() {
        warn!("YOUTUBE_API_KEY is not set, queue resolution will fail");
    }
    let api = YouTubeApi::new(&config.video_source)?;
    let source = Arc::new(FallbackVideoSource::new(
        api,
        ResolverSettings::from(&config.video_source),
    ));

    let bus = NotificationBus::new(config.notifications.capacity);
    let state = AppState::new(store, source, bus);

    // Handle shutdown signals
    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, initiating graceful shutdown"),
            Err(e) => {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    api::start_api_server(state, &config, shutdown).await?;

    info!("Channel booster shutdown complete");
    Ok(())
}
