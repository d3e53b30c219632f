// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

mod handlers;
mod websocket;

use anyhow::Result;
use axum::{
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::aggregator::ViewCountAggregator;
use crate::boosting::BoostingSessionManager;
use crate::config::Config;
use crate::notifications::NotificationBus;
use crate::store::SessionStore;
use crate::video_source::VideoSource;

/// Shared handles every handler works through
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub manager: Arc<BoostingSessionManager>,
    pub aggregator: Arc<ViewCountAggregator>,
    pub bus: NotificationBus,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SessionStore>,
        source: Arc<dyn VideoSource>,
        bus: NotificationBus,
    ) -> Self {
        let aggregator = Arc::new(ViewCountAggregator::new(store.clone()));
        let manager = Arc::new(BoostingSessionManager::new(
            store.clone(),
            source,
            aggregator.clone(),
            bus.clone(),
        ));

        Self {
            store,
            manager,
            aggregator,
            bus,
        }
    }
}

/// `?userId=` selector shared by the per-user read endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: i32,
}

/// Build the router with all routes
pub fn router(state: AppState, enable_cors: bool) -> Router {
    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::get_metrics))
        .route("/ws", get(websocket::ws_handler))
        // Channel routes
        .route("/api/channels", get(handlers::channels::get_channels))
        .route("/api/channel/{id}", get(handlers::channels::get_channel))
        .route(
            "/api/channel/{id}/verification",
            patch(handlers::channels::set_channel_verification),
        )
        .route(
            "/api/channel/{id}/videos",
            get(handlers::channels::get_channel_videos),
        )
        // Boosting routes
        .route("/api/boosting/start", post(handlers::boosting::start_boosting))
        .route("/api/boosting/stop", post(handlers::boosting::stop_boosting))
        .route(
            "/api/boosting/current",
            get(handlers::boosting::get_current_boosting),
        )
        .route("/api/view/count", post(handlers::boosting::count_view))
        // Statistics routes
        .route("/api/user/stats", get(handlers::statistics::get_user_stats))
        .route("/api/geo-metrics", get(handlers::statistics::get_geo_metrics))
        .route(
            "/api/device-metrics",
            get(handlers::statistics::get_device_metrics),
        )
        .route("/api/geo-stat", post(handlers::statistics::create_geo_stat))
        // Content calendar routes
        .route(
            "/api/calendar/events",
            get(handlers::calendar::get_calendar_events),
        )
        .route(
            "/api/calendar/event",
            post(handlers::calendar::create_calendar_event),
        )
        .route(
            "/api/calendar/event/{id}",
            get(handlers::calendar::get_calendar_event)
                .patch(handlers::calendar::update_calendar_event)
                .delete(handlers::calendar::delete_calendar_event),
        )
        // Recommendation routes
        .route(
            "/api/recommendations",
            get(handlers::recommendations::get_recommendations),
        )
        .route(
            "/api/recommendation",
            post(handlers::recommendations::create_recommendation),
        )
        .route(
            "/api/recommendation/{id}/engagement",
            patch(handlers::recommendations::update_engagement),
        )
        // Add state and middleware
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Start the API server and serve until `shutdown` resolves
pub async fn start_api_server<F>(state: AppState, config: &Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state, config.api.enable_cors);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Starting API server on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
