// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::{
    CalendarEventView, ChannelRecommendation, ContentCalendarEvent, SessionSnapshot,
};

/// Session and record changes pushed to observers as `{type, data}` envelopes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum BoostEvent {
    #[serde(rename_all = "camelCase")]
    Started {
        user_id: i32,
        channel_id: String,
        session: SessionSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    Stopped { user_id: i32, channel_id: String },
    #[serde(rename_all = "camelCase")]
    ViewCounted {
        user_id: i32,
        channel_id: String,
        video_id: String,
        session: SessionSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    Finished {
        user_id: i32,
        channel_id: String,
        videos_watched: i32,
    },
    #[serde(rename_all = "camelCase")]
    CalendarEventCreated { user_id: i32, event: CalendarEventView },
    #[serde(rename_all = "camelCase")]
    CalendarEventUpdated { user_id: i32, event: CalendarEventView },
    #[serde(rename_all = "camelCase")]
    CalendarEventDeleted { user_id: i32, id: i32 },
    #[serde(rename_all = "camelCase")]
    RecommendationCreated {
        user_id: i32,
        recommendation: ChannelRecommendation,
    },
    #[serde(rename_all = "camelCase")]
    RecommendationEngagementUpdated {
        user_id: i32,
        recommendation: ChannelRecommendation,
    },
}

impl BoostEvent {
    /// The user whose state the event describes
    pub fn user_id(&self) -> i32 {
        match self {
            BoostEvent::Started { user_id, .. }
            | BoostEvent::Stopped { user_id, .. }
            | BoostEvent::ViewCounted { user_id, .. }
            | BoostEvent::Finished { user_id, .. }
            | BoostEvent::CalendarEventCreated { user_id, .. }
            | BoostEvent::CalendarEventUpdated { user_id, .. }
            | BoostEvent::CalendarEventDeleted { user_id, .. }
            | BoostEvent::RecommendationCreated { user_id, .. }
            | BoostEvent::RecommendationEngagementUpdated { user_id, .. } => *user_id,
        }
    }

    pub fn calendar_deleted(event: &ContentCalendarEvent) -> Self {
        BoostEvent::CalendarEventDeleted {
            user_id: event.user_id,
            id: event.id,
        }
    }
}

/// Fan-out of [`BoostEvent`]s to every connected observer.
///
/// A single broadcast channel preserves publish order, so events of one user
/// reach each subscriber in the order they were published.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<BoostEvent>,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoostEvent> {
        self.sender.subscribe()
    }

    /// Publish without waiting; having no observers is not an error
    pub fn publish(&self, event: BoostEvent) {
        let user_id = event.user_id();
        match self.sender.send(event) {
            Ok(receivers) => debug!("Published event for user {} to {} observers", user_id, receivers),
            Err(_) => debug!("No observers for event of user {}", user_id),
        }
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(256)
    }
}
