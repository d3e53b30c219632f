// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::{AppState, UserQuery};
use crate::boosting::{CompletionOutcome, StartOutcome};
use crate::error::BoostError;
use crate::models::SessionSnapshot;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub user_id: i32,
    pub channel_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRequest {
    pub user_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCountRequest {
    pub user_id: i32,
    #[serde(default)]
    pub channel_id: Option<String>,
    pub video_id: String,
    pub view_duration: i32,
}

/// Start boosting a channel, replacing the user's previous session
pub async fn start_boosting(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Response, BoostError> {
    let outcome = state
        .manager
        .start(request.user_id, &request.channel_id)
        .await?;

    let status = match outcome {
        StartOutcome::Superseded => StatusCode::CONFLICT,
        _ => StatusCode::OK,
    };
    Ok((status, Json(outcome)).into_response())
}

/// Stop the user's session; stopping nothing is not an error
pub async fn stop_boosting(
    State(state): State<AppState>,
    Json(request): Json<StopRequest>,
) -> Result<impl IntoResponse, BoostError> {
    let stopped = state.manager.stop(request.user_id).await?;
    Ok(Json(json!({ "success": true, "stopped": stopped })))
}

pub async fn get_current_boosting(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<SessionSnapshot>, BoostError> {
    Ok(Json(state.manager.current(query.user_id).await?))
}

/// Report that the playing video was watched
pub async fn count_view(
    State(state): State<AppState>,
    Json(request): Json<ViewCountRequest>,
) -> Result<Json<CompletionOutcome>, BoostError> {
    let outcome = state
        .manager
        .report_completion(
            request.user_id,
            request.channel_id.as_deref(),
            &request.video_id,
            request.view_duration,
        )
        .await?;
    Ok(Json(outcome))
}
