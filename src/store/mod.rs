// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{
    BoostingSession, Channel, ChannelRecommendation, ContentCalendarEvent, GeoViewStat,
    NewBoostingSession, NewCalendarEvent, NewChannel, NewChannelRecommendation, NewGeoViewStat,
    NewViewStat, QueueEntry, UpdateCalendarEvent, ViewStat,
};

/// Durable keyed storage for every entity the service owns.
///
/// Each method is atomic on its own. Callers that need read-modify-write on a
/// user's session serialize through the boosting manager's per-user lock.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Cheap round trip used by the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;

    // Channels
    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, StoreError>;
    async fn verified_channels(&self) -> Result<Vec<Channel>, StoreError>;
    /// Inserts the channel, or returns the existing row untouched
    async fn ensure_channel(&self, channel: NewChannel) -> Result<Channel, StoreError>;
    async fn set_channel_verified(
        &self,
        channel_id: &str,
        verified: bool,
    ) -> Result<Channel, StoreError>;

    // Boosting sessions
    async fn get_session(&self, user_id: i32) -> Result<Option<BoostingSession>, StoreError>;
    async fn get_queue(&self, user_id: i32) -> Result<Vec<QueueEntry>, StoreError>;
    /// Drops any session of `session.user_id` and writes the new one together
    /// with its queue. Either everything is written or nothing is.
    async fn replace_session(
        &self,
        session: NewBoostingSession,
        queue: Vec<QueueEntry>,
    ) -> Result<BoostingSession, StoreError>;
    async fn update_session_progress(
        &self,
        user_id: i32,
        active_video_id: Option<&str>,
        videos_watched: i32,
    ) -> Result<BoostingSession, StoreError>;
    /// Returns whether a session existed
    async fn delete_session(&self, user_id: i32) -> Result<bool, StoreError>;

    // View statistics (append-only)
    async fn insert_view_stat(&self, stat: NewViewStat) -> Result<ViewStat, StoreError>;
    async fn get_view_stat(&self, id: i32) -> Result<Option<ViewStat>, StoreError>;
    async fn view_stats_for_user(&self, user_id: i32) -> Result<Vec<ViewStat>, StoreError>;
    async fn insert_geo_view_stat(&self, stat: NewGeoViewStat) -> Result<GeoViewStat, StoreError>;
    async fn geo_view_stats_for_user(&self, user_id: i32) -> Result<Vec<GeoViewStat>, StoreError>;

    // Content calendar
    async fn calendar_events_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ContentCalendarEvent>, StoreError>;
    async fn get_calendar_event(&self, id: i32) -> Result<Option<ContentCalendarEvent>, StoreError>;
    async fn create_calendar_event(
        &self,
        event: NewCalendarEvent,
    ) -> Result<ContentCalendarEvent, StoreError>;
    async fn update_calendar_event(
        &self,
        id: i32,
        patch: UpdateCalendarEvent,
    ) -> Result<ContentCalendarEvent, StoreError>;
    async fn delete_calendar_event(&self, id: i32) -> Result<bool, StoreError>;

    // Channel recommendations
    async fn recommendations_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ChannelRecommendation>, StoreError>;
    async fn create_recommendation(
        &self,
        recommendation: NewChannelRecommendation,
    ) -> Result<ChannelRecommendation, StoreError>;
    async fn update_recommendation_engagement(
        &self,
        id: i32,
        views_actual: i32,
    ) -> Result<ChannelRecommendation, StoreError>;
}
