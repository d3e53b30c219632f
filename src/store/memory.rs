// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::SessionStore;
use crate::error::StoreError;
use crate::models::{
    BoostingSession, Channel, ChannelRecommendation, ContentCalendarEvent, GeoViewStat,
    NewBoostingSession, NewCalendarEvent, NewChannel, NewChannelRecommendation, NewGeoViewStat,
    NewViewStat, QueueEntry, UpdateCalendarEvent, ViewStat,
};

/// In-process store used when no database is configured
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    channels: BTreeMap<String, Channel>,
    sessions: HashMap<i32, BoostingSession>,
    queues: HashMap<i32, Vec<QueueEntry>>,
    view_stats: Vec<ViewStat>,
    geo_view_stats: Vec<GeoViewStat>,
    calendar: BTreeMap<i32, ContentCalendarEvent>,
    recommendations: BTreeMap<i32, ChannelRecommendation>,
    counters: Counters,
}

#[derive(Default)]
struct Counters {
    channel: i32,
    session: i32,
    view_stat: i32,
    geo_view_stat: i32,
    calendar: i32,
    recommendation: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn insert_channel(&mut self, channel: NewChannel) -> Channel {
        let row = Channel {
            id: next(&mut self.counters.channel),
            channel_id: channel.channel_id.clone(),
            name: channel.name,
            description: channel.description,
            thumbnail_url: channel.thumbnail_url,
            banner_url: channel.banner_url,
            category: channel.category,
            is_verified: channel.is_verified,
            created_at: Utc::now().naive_utc(),
        };
        self.channels.insert(channel.channel_id, row.clone());
        row
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, StoreError> {
        Ok(self.tables.read().await.channels.get(channel_id).cloned())
    }

    async fn verified_channels(&self) -> Result<Vec<Channel>, StoreError> {
        let tables = self.tables.read().await;
        let mut channels: Vec<Channel> = tables
            .channels
            .values()
            .filter(|c| c.is_verified)
            .cloned()
            .collect();
        channels.sort_by_key(|c| c.id);
        Ok(channels)
    }

    async fn ensure_channel(&self, channel: NewChannel) -> Result<Channel, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.channels.get(&channel.channel_id) {
            return Ok(existing.clone());
        }
        Ok(tables.insert_channel(channel))
    }

    async fn set_channel_verified(
        &self,
        channel_id: &str,
        verified: bool,
    ) -> Result<Channel, StoreError> {
        let mut tables = self.tables.write().await;
        let channel = tables
            .channels
            .get_mut(channel_id)
            .ok_or_else(|| StoreError::NotFound(format!("channel {}", channel_id)))?;
        channel.is_verified = verified;
        Ok(channel.clone())
    }

    async fn get_session(&self, user_id: i32) -> Result<Option<BoostingSession>, StoreError> {
        Ok(self.tables.read().await.sessions.get(&user_id).cloned())
    }

    async fn get_queue(&self, user_id: i32) -> Result<Vec<QueueEntry>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .queues
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_session(
        &self,
        session: NewBoostingSession,
        queue: Vec<QueueEntry>,
    ) -> Result<BoostingSession, StoreError> {
        let mut tables = self.tables.write().await;
        let row = BoostingSession {
            id: next(&mut tables.counters.session),
            user_id: session.user_id,
            channel_id: session.channel_id,
            start_time: session.start_time,
            last_updated: session.last_updated,
            active_video_id: session.active_video_id,
            videos_watched: session.videos_watched,
        };
        tables.sessions.insert(row.user_id, row.clone());
        tables.queues.insert(row.user_id, queue);
        Ok(row)
    }

    async fn update_session_progress(
        &self,
        user_id: i32,
        active_video_id: Option<&str>,
        videos_watched: i32,
    ) -> Result<BoostingSession, StoreError> {
        let mut tables = self.tables.write().await;
        let session = tables
            .sessions
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("boosting session of user {}", user_id)))?;
        session.active_video_id = active_video_id.map(str::to_string);
        session.videos_watched = videos_watched;
        session.last_updated = Utc::now().naive_utc();
        Ok(session.clone())
    }

    async fn delete_session(&self, user_id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        tables.queues.remove(&user_id);
        Ok(tables.sessions.remove(&user_id).is_some())
    }

    async fn insert_view_stat(&self, stat: NewViewStat) -> Result<ViewStat, StoreError> {
        let mut tables = self.tables.write().await;
        let row = ViewStat {
            id: next(&mut tables.counters.view_stat),
            user_id: stat.user_id,
            channel_id: stat.channel_id,
            video_id: stat.video_id,
            view_duration: stat.view_duration,
            created_at: Utc::now().naive_utc(),
        };
        tables.view_stats.push(row.clone());
        Ok(row)
    }

    async fn get_view_stat(&self, id: i32) -> Result<Option<ViewStat>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .view_stats
            .iter()
            .find(|stat| stat.id == id)
            .cloned())
    }

    async fn view_stats_for_user(&self, user_id: i32) -> Result<Vec<ViewStat>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .view_stats
            .iter()
            .filter(|stat| stat.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_geo_view_stat(&self, stat: NewGeoViewStat) -> Result<GeoViewStat, StoreError> {
        let mut tables = self.tables.write().await;
        let row = GeoViewStat {
            id: next(&mut tables.counters.geo_view_stat),
            view_stat_id: stat.view_stat_id,
            user_id: stat.user_id,
            channel_id: stat.channel_id,
            country: stat.country,
            region: stat.region,
            city: stat.city,
            ip_address: stat.ip_address,
            device_type: stat.device_type,
            browser: stat.browser,
            created_at: Utc::now().naive_utc(),
        };
        tables.geo_view_stats.push(row.clone());
        Ok(row)
    }

    async fn geo_view_stats_for_user(&self, user_id: i32) -> Result<Vec<GeoViewStat>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .geo_view_stats
            .iter()
            .filter(|stat| stat.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn calendar_events_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ContentCalendarEvent>, StoreError> {
        let tables = self.tables.read().await;
        let mut events: Vec<ContentCalendarEvent> = tables
            .calendar
            .values()
            .filter(|event| event.user_id == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.scheduled_date, event.id));
        Ok(events)
    }

    async fn get_calendar_event(&self, id: i32) -> Result<Option<ContentCalendarEvent>, StoreError> {
        Ok(self.tables.read().await.calendar.get(&id).cloned())
    }

    async fn create_calendar_event(
        &self,
        event: NewCalendarEvent,
    ) -> Result<ContentCalendarEvent, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now().naive_utc();
        let row = ContentCalendarEvent {
            id: next(&mut tables.counters.calendar),
            user_id: event.user_id,
            title: event.title,
            description: event.description,
            scheduled_date: event.scheduled_date,
            channel_id: event.channel_id,
            video_ids: event.video_ids,
            status: event.status,
            created_at: now,
            updated_at: now,
        };
        tables.calendar.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_calendar_event(
        &self,
        id: i32,
        patch: UpdateCalendarEvent,
    ) -> Result<ContentCalendarEvent, StoreError> {
        let mut tables = self.tables.write().await;
        let event = tables
            .calendar
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("calendar event {}", id)))?;
        patch.apply_to(event);
        event.updated_at = Utc::now().naive_utc();
        Ok(event.clone())
    }

    async fn delete_calendar_event(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.calendar.remove(&id).is_some())
    }

    async fn recommendations_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ChannelRecommendation>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .recommendations
            .values()
            .filter(|rec| rec.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_recommendation(
        &self,
        recommendation: NewChannelRecommendation,
    ) -> Result<ChannelRecommendation, StoreError> {
        let mut tables = self.tables.write().await;
        let row = ChannelRecommendation {
            id: next(&mut tables.counters.recommendation),
            user_id: recommendation.user_id,
            channel_id: recommendation.channel_id,
            impact_score: recommendation.impact_score,
            views_potential: recommendation.views_potential,
            views_actual: recommendation.views_actual,
            category: recommendation.category,
            recommendation_date: Utc::now().naive_utc(),
            last_engaged: recommendation.last_engaged,
        };
        tables.recommendations.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_recommendation_engagement(
        &self,
        id: i32,
        views_actual: i32,
    ) -> Result<ChannelRecommendation, StoreError> {
        let mut tables = self.tables.write().await;
        let rec = tables
            .recommendations
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("recommendation {}", id)))?;
        rec.views_actual = views_actual;
        rec.last_engaged = Some(Utc::now().naive_utc());
        Ok(rec.clone())
    }
}
