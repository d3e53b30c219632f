// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use channel_booster::api::AppState;
use channel_booster::error::StoreError;
use channel_booster::models::{
    BoostingSession, Channel, ChannelRecommendation, ContentCalendarEvent, GeoViewStat,
    NewBoostingSession, NewCalendarEvent, NewChannel, NewChannelRecommendation, NewGeoViewStat,
    NewViewStat, PlayableItem, QueueEntry, UpdateCalendarEvent, ViewStat,
};
use channel_booster::notifications::NotificationBus;
use channel_booster::store::{MemoryStore, SessionStore};
use channel_booster::video_source::{
    CollectionPage, ItemStub, PlatformApi, QueueResolution, SourceError, VideoSource,
};

pub fn items(prefix: &str, count: usize) -> Vec<PlayableItem> {
    (0..count)
        .map(|i| PlayableItem::queued(format!("{}-{}", prefix, i), format!("{} video {}", prefix, i), 45))
        .collect()
}

pub fn stubs(prefix: &str, count: usize) -> Vec<ItemStub> {
    (0..count)
        .map(|i| ItemStub {
            video_id: format!("{}-{}", prefix, i),
            title: format!("{} video {}", prefix, i),
            thumbnail_url: None,
        })
        .collect()
}

/// Per-channel canned resolutions; unknown channels resolve to `Empty`
#[derive(Default)]
pub struct ScriptedSource {
    queues: HashMap<String, QueueResolution>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, channel_id: &str, resolution: QueueResolution) -> Self {
        self.queues.insert(channel_id.to_string(), resolution);
        self
    }
}

#[async_trait]
impl VideoSource for ScriptedSource {
    async fn resolve_queue(&self, channel_id: &str) -> QueueResolution {
        self.queues
            .get(channel_id)
            .cloned()
            .unwrap_or(QueueResolution::Empty)
    }

    fn feed_url(&self, channel_id: &str) -> Option<String> {
        Some(format!("https://feeds.test/{}", channel_id))
    }
}

/// Source that parks inside `resolve_queue` until released
pub struct GatedSource {
    pub entered: Notify,
    pub release: Notify,
    items: Vec<PlayableItem>,
}

impl GatedSource {
    pub fn new(items: Vec<PlayableItem>) -> Self {
        Self {
            entered: Notify::new(),
            release: Notify::new(),
            items,
        }
    }
}

#[async_trait]
impl VideoSource for GatedSource {
    async fn resolve_queue(&self, _: &str) -> QueueResolution {
        self.entered.notify_one();
        self.release.notified().await;
        QueueResolution::Items(self.items.clone())
    }
}

/// Platform whose uploads lookup always fails and whose search returns a fixed list
pub struct SearchOnlyPlatform {
    pub search: Vec<ItemStub>,
}

#[async_trait]
impl PlatformApi for SearchOnlyPlatform {
    async fn uploads_collection(&self, _: &str) -> Result<Option<String>, SourceError> {
        Err(SourceError::Api {
            status: 403,
            message: "quotaExceeded".into(),
        })
    }

    async fn collection_page(
        &self,
        _: &str,
        _: Option<&str>,
        _: u32,
    ) -> Result<CollectionPage, SourceError> {
        Ok(CollectionPage::default())
    }

    async fn search_channel_videos(&self, _: &str, _: u32) -> Result<Vec<ItemStub>, SourceError> {
        Ok(self.search.clone())
    }

    async fn durations(&self, video_ids: &[String]) -> Result<HashMap<String, String>, SourceError> {
        // Only the first video has a known duration
        Ok(video_ids
            .iter()
            .take(1)
            .map(|id| (id.clone(), "PT2M".to_string()))
            .collect())
    }
}

pub fn app_state(store: Arc<dyn SessionStore>, source: Arc<dyn VideoSource>) -> AppState {
    AppState::new(store, source, NotificationBus::new(64))
}

/// Memory store whose view-stat inserts can be switched to fail
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_view_inserts: AtomicBool,
}

impl FlakyStore {
    pub fn fail_views(&self, fail: bool) {
        self.fail_view_inserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, StoreError> {
        self.inner.get_channel(channel_id).await
    }

    async fn verified_channels(&self) -> Result<Vec<Channel>, StoreError> {
        self.inner.verified_channels().await
    }

    async fn ensure_channel(&self, channel: NewChannel) -> Result<Channel, StoreError> {
        self.inner.ensure_channel(channel).await
    }

    async fn set_channel_verified(
        &self,
        channel_id: &str,
        verified: bool,
    ) -> Result<Channel, StoreError> {
        self.inner.set_channel_verified(channel_id, verified).await
    }

    async fn get_session(&self, user_id: i32) -> Result<Option<BoostingSession>, StoreError> {
        self.inner.get_session(user_id).await
    }

    async fn get_queue(&self, user_id: i32) -> Result<Vec<QueueEntry>, StoreError> {
        self.inner.get_queue(user_id).await
    }

    async fn replace_session(
        &self,
        session: NewBoostingSession,
        queue: Vec<QueueEntry>,
    ) -> Result<BoostingSession, StoreError> {
        self.inner.replace_session(session, queue).await
    }

    async fn update_session_progress(
        &self,
        user_id: i32,
        active_video_id: Option<&str>,
        videos_watched: i32,
    ) -> Result<BoostingSession, StoreError> {
        self.inner
            .update_session_progress(user_id, active_video_id, videos_watched)
            .await
    }

    async fn delete_session(&self, user_id: i32) -> Result<bool, StoreError> {
        self.inner.delete_session(user_id).await
    }

    async fn insert_view_stat(&self, stat: NewViewStat) -> Result<ViewStat, StoreError> {
        if self.fail_view_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Pool("connection refused".into()));
        }
        self.inner.insert_view_stat(stat).await
    }

    async fn get_view_stat(&self, id: i32) -> Result<Option<ViewStat>, StoreError> {
        self.inner.get_view_stat(id).await
    }

    async fn view_stats_for_user(&self, user_id: i32) -> Result<Vec<ViewStat>, StoreError> {
        self.inner.view_stats_for_user(user_id).await
    }

    async fn insert_geo_view_stat(&self, stat: NewGeoViewStat) -> Result<GeoViewStat, StoreError> {
        self.inner.insert_geo_view_stat(stat).await
    }

    async fn geo_view_stats_for_user(&self, user_id: i32) -> Result<Vec<GeoViewStat>, StoreError> {
        self.inner.geo_view_stats_for_user(user_id).await
    }

    async fn calendar_events_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ContentCalendarEvent>, StoreError> {
        self.inner.calendar_events_for_user(user_id).await
    }

    async fn get_calendar_event(&self, id: i32) -> Result<Option<ContentCalendarEvent>, StoreError> {
        self.inner.get_calendar_event(id).await
    }

    async fn create_calendar_event(
        &self,
        event: NewCalendarEvent,
    ) -> Result<ContentCalendarEvent, StoreError> {
        self.inner.create_calendar_event(event).await
    }

    async fn update_calendar_event(
        &self,
        id: i32,
        patch: UpdateCalendarEvent,
    ) -> Result<ContentCalendarEvent, StoreError> {
        self.inner.update_calendar_event(id, patch).await
    }

    async fn delete_calendar_event(&self, id: i32) -> Result<bool, StoreError> {
        self.inner.delete_calendar_event(id).await
    }

    async fn recommendations_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ChannelRecommendation>, StoreError> {
        self.inner.recommendations_for_user(user_id).await
    }

    async fn create_recommendation(
        &self,
        recommendation: NewChannelRecommendation,
    ) -> Result<ChannelRecommendation, StoreError> {
        self.inner.create_recommendation(recommendation).await
    }

    async fn update_recommendation_engagement(
        &self,
        id: i32,
        views_actual: i32,
    ) -> Result<ChannelRecommendation, StoreError> {
        self.inner
            .update_recommendation_engagement(id, views_actual)
            .await
    }
}
