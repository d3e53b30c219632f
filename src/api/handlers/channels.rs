// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::api::AppState;
use crate::error::BoostError;
use crate::models::{Channel, PlayableItem};

/// List verified channels
pub async fn get_channels(State(state): State<AppState>) -> Result<Json<Vec<Channel>>, BoostError> {
    Ok(Json(state.store.verified_channels().await?))
}

/// Get a channel by its platform id
pub async fn get_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<Json<Channel>, BoostError> {
    state
        .store
        .get_channel(&channel_id)
        .await?
        .map(Json)
        .ok_or_else(|| BoostError::NotFound(format!("channel {}", channel_id)))
}

/// Preview the queue a boosting session on this channel would play
pub async fn get_channel_videos(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<Json<Vec<PlayableItem>>, BoostError> {
    Ok(Json(state.manager.preview_queue(&channel_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationUpdate {
    pub is_verified: bool,
}

/// Flip the verification flag, the only mutable field of a channel
pub async fn set_channel_verification(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Json(update): Json<VerificationUpdate>,
) -> Result<Json<Channel>, BoostError> {
    let channel = state
        .store
        .set_channel_verified(&channel_id, update.is_verified)
        .await?;
    info!(
        "Channel {} verification set to {}",
        channel.channel_id, channel.is_verified
    );
    Ok(Json(channel))
}
