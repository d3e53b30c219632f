// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::cmp::Ordering;

use crate::api::{AppState, UserQuery};
use crate::error::BoostError;
use crate::models::{ChannelImpactScore, ChannelRecommendation, NewChannelRecommendation};
use crate::notifications::BoostEvent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementUpdate {
    pub views_actual: i32,
}

/// Recommendations of a user, highest impact first
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<ChannelImpactScore>>, BoostError> {
    let mut recommendations = state.store.recommendations_for_user(query.user_id).await?;
    recommendations.sort_by(|a, b| {
        b.impact_score
            .partial_cmp(&a.impact_score)
            .unwrap_or(Ordering::Equal)
    });

    let mut scores = Vec::with_capacity(recommendations.len());
    for recommendation in recommendations {
        let channel = state.store.get_channel(&recommendation.channel_id).await?;
        scores.push(ChannelImpactScore::new(recommendation, channel.as_ref()));
    }
    Ok(Json(scores))
}

pub async fn create_recommendation(
    State(state): State<AppState>,
    Json(recommendation): Json<NewChannelRecommendation>,
) -> Result<(StatusCode, Json<ChannelRecommendation>), BoostError> {
    if recommendation.channel_id.trim().is_empty() {
        return Err(BoostError::InvalidInput("channel id must not be empty".into()));
    }
    if !recommendation.impact_score.is_finite() {
        return Err(BoostError::InvalidInput("impact score must be a number".into()));
    }

    let created = state.store.create_recommendation(recommendation).await?;
    state.bus.publish(BoostEvent::RecommendationCreated {
        user_id: created.user_id,
        recommendation: created.clone(),
    });

    Ok((StatusCode::CREATED, Json(created)))
}

/// Record how many views a recommendation actually produced
pub async fn update_engagement(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<EngagementUpdate>,
) -> Result<Json<ChannelRecommendation>, BoostError> {
    if update.views_actual < 0 {
        return Err(BoostError::InvalidInput(format!(
            "views must not be negative, got {}",
            update.views_actual
        )));
    }

    let updated = state
        .store
        .update_recommendation_engagement(id, update.views_actual)
        .await?;
    state.bus.publish(BoostEvent::RecommendationEngagementUpdated {
        user_id: updated.user_id,
        recommendation: updated.clone(),
    });

    Ok(Json(updated))
}
