// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::api::{AppState, UserQuery};
use crate::error::BoostError;
use crate::models::{
    CalendarEventView, CalendarStatus, ContentCalendarEvent, NewCalendarEvent,
    UpdateCalendarEvent,
};
use crate::notifications::BoostEvent;

fn validate_status(status: &str) -> Result<(), BoostError> {
    status
        .parse::<CalendarStatus>()
        .map(|_| ())
        .map_err(BoostError::InvalidInput)
}

fn validate_title(title: &str) -> Result<(), BoostError> {
    if title.trim().is_empty() {
        return Err(BoostError::InvalidInput("title must not be empty".into()));
    }
    Ok(())
}

async fn event_view(
    state: &AppState,
    event: ContentCalendarEvent,
) -> Result<CalendarEventView, BoostError> {
    let channel = state.store.get_channel(&event.channel_id).await?;
    Ok(CalendarEventView::new(event, channel.as_ref()))
}

/// List a user's calendar in schedule order
pub async fn get_calendar_events(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<CalendarEventView>>, BoostError> {
    let events = state.store.calendar_events_for_user(query.user_id).await?;

    let mut views = Vec::with_capacity(events.len());
    for event in events {
        views.push(event_view(&state, event).await?);
    }
    Ok(Json(views))
}

pub async fn get_calendar_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ContentCalendarEvent>, BoostError> {
    state
        .store
        .get_calendar_event(id)
        .await?
        .map(Json)
        .ok_or_else(|| BoostError::NotFound(format!("calendar event {}", id)))
}

pub async fn create_calendar_event(
    State(state): State<AppState>,
    Json(event): Json<NewCalendarEvent>,
) -> Result<(StatusCode, Json<ContentCalendarEvent>), BoostError> {
    validate_title(&event.title)?;
    validate_status(&event.status)?;

    let created = state.store.create_calendar_event(event).await?;
    info!(
        "Created calendar event {} for user {}",
        created.id, created.user_id
    );

    let view = event_view(&state, created.clone()).await?;
    state.bus.publish(BoostEvent::CalendarEventCreated {
        user_id: created.user_id,
        event: view,
    });

    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial update; fields absent from the body keep their value
pub async fn update_calendar_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<UpdateCalendarEvent>,
) -> Result<Json<ContentCalendarEvent>, BoostError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(status) = &patch.status {
        validate_status(status)?;
    }

    let updated = state.store.update_calendar_event(id, patch).await?;

    let view = event_view(&state, updated.clone()).await?;
    state.bus.publish(BoostEvent::CalendarEventUpdated {
        user_id: updated.user_id,
        event: view,
    });

    Ok(Json(updated))
}

pub async fn delete_calendar_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, BoostError> {
    let event = state
        .store
        .get_calendar_event(id)
        .await?
        .ok_or_else(|| BoostError::NotFound(format!("calendar event {}", id)))?;

    if !state.store.delete_calendar_event(id).await? {
        return Err(BoostError::NotFound(format!("calendar event {}", id)));
    }

    info!("Deleted calendar event {} of user {}", id, event.user_id);
    state.bus.publish(BoostEvent::calendar_deleted(&event));

    Ok(Json(json!({ "success": true })))
}
