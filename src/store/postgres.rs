// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use std::sync::Arc;
use tracing::debug;

use super::SessionStore;
use crate::db::{Database, DbConnection};
use crate::error::StoreError;
use crate::models::{
    BoostingSession, Channel, ChannelRecommendation, ContentCalendarEvent, GeoViewStat,
    NewBoostingSession, NewCalendarEvent, NewChannel, NewChannelRecommendation, NewGeoViewStat,
    NewViewStat, QueueEntry, UpdateCalendarEvent, ViewStat,
};
use crate::schema::{
    boosting_queue_items, channel_recommendations, channels, content_calendar, current_boosting,
    geo_view_stats, view_stats,
};

/// Postgres-backed store on top of the pooled diesel-async connection
pub struct PgStore {
    db: Arc<Database>,
}

impl PgStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get a database connection from the pool
    async fn get_connection(&self) -> Result<DbConnection, StoreError> {
        self.db
            .get_connection()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.get_connection().await?;
        diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("1"))
            .get_result::<i32>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(channels::table
            .filter(channels::channel_id.eq(channel_id))
            .select(Channel::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn verified_channels(&self) -> Result<Vec<Channel>, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(channels::table
            .filter(channels::is_verified.eq(true))
            .order_by(channels::id.asc())
            .select(Channel::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn ensure_channel(&self, channel: NewChannel) -> Result<Channel, StoreError> {
        let mut conn = self.get_connection().await?;
        diesel::insert_into(channels::table)
            .values(&channel)
            .on_conflict(channels::channel_id)
            .do_nothing()
            .execute(&mut conn)
            .await?;

        Ok(channels::table
            .filter(channels::channel_id.eq(&channel.channel_id))
            .select(Channel::as_select())
            .first(&mut conn)
            .await?)
    }

    async fn set_channel_verified(
        &self,
        channel_id: &str,
        verified: bool,
    ) -> Result<Channel, StoreError> {
        let mut conn = self.get_connection().await?;
        diesel::update(channels::table.filter(channels::channel_id.eq(channel_id)))
            .set(channels::is_verified.eq(verified))
            .returning(Channel::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("channel {}", channel_id)))
    }

    async fn get_session(&self, user_id: i32) -> Result<Option<BoostingSession>, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(current_boosting::table
            .filter(current_boosting::user_id.eq(user_id))
            .select(BoostingSession::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn get_queue(&self, user_id: i32) -> Result<Vec<QueueEntry>, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(boosting_queue_items::table
            .filter(boosting_queue_items::user_id.eq(user_id))
            .order_by(boosting_queue_items::position.asc())
            .select(QueueEntry::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn replace_session(
        &self,
        session: NewBoostingSession,
        queue: Vec<QueueEntry>,
    ) -> Result<BoostingSession, StoreError> {
        let mut conn = self.get_connection().await?;
        let user_id = session.user_id;

        let row = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    // Queue rows cascade with the session row
                    diesel::delete(
                        current_boosting::table.filter(current_boosting::user_id.eq(user_id)),
                    )
                    .execute(conn)
                    .await?;

                    let row = diesel::insert_into(current_boosting::table)
                        .values(&session)
                        .returning(BoostingSession::as_returning())
                        .get_result(conn)
                        .await?;

                    if !queue.is_empty() {
                        diesel::insert_into(boosting_queue_items::table)
                            .values(&queue)
                            .execute(conn)
                            .await?;
                    }

                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        debug!("Persisted boosting session {} for user {}", row.id, user_id);
        Ok(row)
    }

    async fn update_session_progress(
        &self,
        user_id: i32,
        active_video_id: Option<&str>,
        videos_watched: i32,
    ) -> Result<BoostingSession, StoreError> {
        let mut conn = self.get_connection().await?;
        diesel::update(current_boosting::table.filter(current_boosting::user_id.eq(user_id)))
            .set((
                current_boosting::active_video_id.eq(active_video_id),
                current_boosting::videos_watched.eq(videos_watched),
                current_boosting::last_updated.eq(Utc::now().naive_utc()),
            ))
            .returning(BoostingSession::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("boosting session of user {}", user_id)))
    }

    async fn delete_session(&self, user_id: i32) -> Result<bool, StoreError> {
        let mut conn = self.get_connection().await?;
        let deleted = diesel::delete(
            current_boosting::table.filter(current_boosting::user_id.eq(user_id)),
        )
        .execute(&mut conn)
        .await?;
        Ok(deleted > 0)
    }

    async fn insert_view_stat(&self, stat: NewViewStat) -> Result<ViewStat, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(diesel::insert_into(view_stats::table)
            .values(&stat)
            .returning(ViewStat::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    async fn get_view_stat(&self, id: i32) -> Result<Option<ViewStat>, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(view_stats::table
            .find(id)
            .select(ViewStat::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn view_stats_for_user(&self, user_id: i32) -> Result<Vec<ViewStat>, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(view_stats::table
            .filter(view_stats::user_id.eq(user_id))
            .order_by(view_stats::id.asc())
            .select(ViewStat::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn insert_geo_view_stat(&self, stat: NewGeoViewStat) -> Result<GeoViewStat, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(diesel::insert_into(geo_view_stats::table)
            .values(&stat)
            .returning(GeoViewStat::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    async fn geo_view_stats_for_user(&self, user_id: i32) -> Result<Vec<GeoViewStat>, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(geo_view_stats::table
            .filter(geo_view_stats::user_id.eq(user_id))
            .order_by(geo_view_stats::id.asc())
            .select(GeoViewStat::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn calendar_events_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ContentCalendarEvent>, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(content_calendar::table
            .filter(content_calendar::user_id.eq(user_id))
            .order_by((content_calendar::scheduled_date.asc(), content_calendar::id.asc()))
            .select(ContentCalendarEvent::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn get_calendar_event(&self, id: i32) -> Result<Option<ContentCalendarEvent>, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(content_calendar::table
            .find(id)
            .select(ContentCalendarEvent::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn create_calendar_event(
        &self,
        event: NewCalendarEvent,
    ) -> Result<ContentCalendarEvent, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(diesel::insert_into(content_calendar::table)
            .values(&event)
            .returning(ContentCalendarEvent::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    async fn update_calendar_event(
        &self,
        id: i32,
        patch: UpdateCalendarEvent,
    ) -> Result<ContentCalendarEvent, StoreError> {
        let mut conn = self.get_connection().await?;
        diesel::update(content_calendar::table.find(id))
            .set((&patch, content_calendar::updated_at.eq(Utc::now().naive_utc())))
            .returning(ContentCalendarEvent::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("calendar event {}", id)))
    }

    async fn delete_calendar_event(&self, id: i32) -> Result<bool, StoreError> {
        let mut conn = self.get_connection().await?;
        let deleted = diesel::delete(content_calendar::table.find(id))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }

    async fn recommendations_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ChannelRecommendation>, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(channel_recommendations::table
            .filter(channel_recommendations::user_id.eq(user_id))
            .order_by(channel_recommendations::impact_score.desc())
            .select(ChannelRecommendation::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn create_recommendation(
        &self,
        recommendation: NewChannelRecommendation,
    ) -> Result<ChannelRecommendation, StoreError> {
        let mut conn = self.get_connection().await?;
        Ok(diesel::insert_into(channel_recommendations::table)
            .values(&recommendation)
            .returning(ChannelRecommendation::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    async fn update_recommendation_engagement(
        &self,
        id: i32,
        views_actual: i32,
    ) -> Result<ChannelRecommendation, StoreError> {
        let mut conn = self.get_connection().await?;
        diesel::update(channel_recommendations::table.find(id))
            .set((
                channel_recommendations::views_actual.eq(views_actual),
                channel_recommendations::last_engaged.eq(Some(Utc::now().naive_utc())),
            ))
            .returning(ChannelRecommendation::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("recommendation {}", id)))
    }
}
