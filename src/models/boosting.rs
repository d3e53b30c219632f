// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{boosting_queue_items, current_boosting};

/// Live boosting state of one user. At most one row exists per user.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = current_boosting)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct BoostingSession {
    pub id: i32,
    pub user_id: i32,
    pub channel_id: String,
    pub start_time: NaiveDateTime,
    pub last_updated: NaiveDateTime,
    pub active_video_id: Option<String>,
    pub videos_watched: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = current_boosting)]
pub struct NewBoostingSession {
    pub user_id: i32,
    pub channel_id: String,
    pub start_time: NaiveDateTime,
    pub last_updated: NaiveDateTime,
    pub active_video_id: Option<String>,
    pub videos_watched: i32,
}

impl From<&BoostingSession> for NewBoostingSession {
    fn from(session: &BoostingSession) -> Self {
        Self {
            user_id: session.user_id,
            channel_id: session.channel_id.clone(),
            start_time: session.start_time,
            last_updated: session.last_updated,
            active_video_id: session.active_video_id.clone(),
            videos_watched: session.videos_watched,
        }
    }
}

/// Persisted queue slot. Only order and metadata are stored; per-item status
/// is derived from the owning session's progress.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = boosting_queue_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub user_id: i32,
    pub position: i32,
    pub video_id: String,
    pub title: String,
    pub duration: i32,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Queued,
    Playing,
    Completed,
}

/// A unit of playback inside a session queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayableItem {
    pub video_id: String,
    pub title: String,
    /// Seconds
    pub duration: u32,
    pub thumbnail_url: Option<String>,
    pub status: ItemStatus,
}

impl PlayableItem {
    pub fn queued(video_id: impl Into<String>, title: impl Into<String>, duration: u32) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            duration,
            thumbnail_url: None,
            status: ItemStatus::Queued,
        }
    }

    pub fn to_entry(&self, user_id: i32, position: usize) -> QueueEntry {
        QueueEntry {
            user_id,
            position: position as i32,
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            duration: i32::try_from(self.duration).unwrap_or(i32::MAX),
            thumbnail_url: self.thumbnail_url.clone(),
        }
    }
}

/// Session row together with its queue, statuses reconstructed from progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub session: BoostingSession,
    pub queue: Vec<PlayableItem>,
}

impl SessionSnapshot {
    /// Items before the active index are completed, the active index is
    /// playing and the rest are queued.
    pub fn from_parts(session: BoostingSession, mut entries: Vec<QueueEntry>) -> Self {
        entries.sort_by_key(|entry| entry.position);
        let active_index = session.videos_watched.max(0) as usize;

        let queue = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| PlayableItem {
                status: match index.cmp(&active_index) {
                    std::cmp::Ordering::Less => ItemStatus::Completed,
                    std::cmp::Ordering::Equal => ItemStatus::Playing,
                    std::cmp::Ordering::Greater => ItemStatus::Queued,
                },
                video_id: entry.video_id,
                title: entry.title,
                duration: entry.duration.max(0) as u32,
                thumbnail_url: entry.thumbnail_url,
            })
            .collect();

        Self { session, queue }
    }

    pub fn active_item(&self) -> Option<&PlayableItem> {
        self.queue
            .iter()
            .find(|item| item.status == ItemStatus::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(videos_watched: i32) -> BoostingSession {
        let now = Utc::now().naive_utc();
        BoostingSession {
            id: 1,
            user_id: 7,
            channel_id: "UC123".into(),
            start_time: now,
            last_updated: now,
            active_video_id: Some(format!("v{}", videos_watched)),
            videos_watched,
        }
    }

    fn entries(count: usize) -> Vec<QueueEntry> {
        (0..count)
            .map(|i| PlayableItem::queued(format!("v{}", i), format!("Video {}", i), 60).to_entry(7, i))
            .collect()
    }

    #[test]
    fn statuses_follow_progress() {
        let snapshot = SessionSnapshot::from_parts(session(1), entries(3));
        let statuses: Vec<_> = snapshot.queue.iter().map(|item| item.status).collect();
        assert_eq!(
            statuses,
            vec![ItemStatus::Completed, ItemStatus::Playing, ItemStatus::Queued]
        );
        assert_eq!(snapshot.active_item().map(|item| item.video_id.as_str()), Some("v1"));
    }

    #[test]
    fn queue_order_comes_from_position_not_storage_order() {
        let mut shuffled = entries(3);
        shuffled.reverse();
        let snapshot = SessionSnapshot::from_parts(session(0), shuffled);
        let ids: Vec<_> = snapshot.queue.iter().map(|item| item.video_id.as_str()).collect();
        assert_eq!(ids, vec!["v0", "v1", "v2"]);
        assert_eq!(snapshot.queue[0].status, ItemStatus::Playing);
    }

    #[test]
    fn snapshot_serializes_session_fields_flat() {
        let snapshot = SessionSnapshot::from_parts(session(0), entries(1));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["videosWatched"], 0);
        assert_eq!(json["queue"][0]["status"], "playing");
    }
}
