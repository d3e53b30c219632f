// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::api::{AppState, UserQuery};
use crate::error::BoostError;
use crate::models::{DeviceViewMetrics, GeoViewMetrics, GeoViewStat, NewGeoViewStat, UserStats};

/// Totals and per-channel breakdown for a user
pub async fn get_user_stats(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserStats>, BoostError> {
    Ok(Json(state.aggregator.compute_user_stats(query.user_id).await?))
}

pub async fn get_geo_metrics(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<GeoViewMetrics>>, BoostError> {
    Ok(Json(state.aggregator.compute_geo_metrics(query.user_id).await?))
}

pub async fn get_device_metrics(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<DeviceViewMetrics>>, BoostError> {
    Ok(Json(
        state.aggregator.compute_device_metrics(query.user_id).await?,
    ))
}

/// Attach location and device details to a recorded view
pub async fn create_geo_stat(
    State(state): State<AppState>,
    Json(geo): Json<NewGeoViewStat>,
) -> Result<(StatusCode, Json<GeoViewStat>), BoostError> {
    let stat = state.aggregator.record_geo_view(geo).await?;
    Ok((StatusCode::CREATED, Json(stat)))
}
