// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Boosting session lifecycle.
//!
//! Every user is either idle or has exactly one active session. All
//! operations on one user run under that user's slot lock, except for queue
//! resolution, which runs unlocked and is discarded if a newer start or a
//! stop arrived in the meantime.

mod locks;

pub use locks::{UserLocks, UserSlot};

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::aggregator::ViewCountAggregator;
use crate::error::BoostError;
use crate::metrics;
use crate::models::{
    BoostingSession, NewBoostingSession, NewChannel, PlayableItem, QueueEntry, SessionSnapshot,
    ViewStat,
};
use crate::notifications::{BoostEvent, NotificationBus};
use crate::store::SessionStore;
use crate::video_source::{QueueResolution, VideoSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum StartOutcome {
    Started(SessionSnapshot),
    /// No session was created; the caller may fall back to passive feed playback
    #[serde(rename_all = "camelCase")]
    NothingToPlay {
        channel_id: String,
        feed_url: Option<String>,
    },
    /// A later start or stop for the same user won while the queue was resolving
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CompletionOutcome {
    /// View recorded and the next item is playing
    #[serde(rename_all = "camelCase")]
    Counted {
        view_stat: ViewStat,
        session: SessionSnapshot,
    },
    /// View recorded for the last item; the session is gone
    #[serde(rename_all = "camelCase")]
    Finished {
        view_stat: ViewStat,
        channel_id: String,
        videos_watched: i32,
    },
    /// Item was already counted in this session, nothing changed
    #[serde(rename_all = "camelCase")]
    Duplicate { session: SessionSnapshot },
}

pub struct BoostingSessionManager {
    store: Arc<dyn SessionStore>,
    source: Arc<dyn VideoSource>,
    aggregator: Arc<ViewCountAggregator>,
    bus: NotificationBus,
    users: UserLocks,
}

impl BoostingSessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        source: Arc<dyn VideoSource>,
        aggregator: Arc<ViewCountAggregator>,
        bus: NotificationBus,
    ) -> Self {
        Self {
            store,
            source,
            aggregator,
            bus,
            users: UserLocks::new(),
        }
    }

    /// Start boosting `channel_id`, replacing whatever the user was boosting before
    pub async fn start(&self, user_id: i32, channel_id: &str) -> Result<StartOutcome, BoostError> {
        validate_user(user_id)?;
        let channel_id = validate_id("channel id", channel_id)?;

        let slot = self.users.slot(user_id).await;
        let generation = {
            let _guard = slot.lock().await;
            let generation = slot.advance();
            self.remove_session(user_id).await?;
            generation
        };

        debug!("Resolving queue of channel {} for user {}", channel_id, user_id);
        let items = match self.source.resolve_queue(channel_id).await {
            QueueResolution::Items(items) if !items.is_empty() => items,
            QueueResolution::Items(_) | QueueResolution::Empty => {
                info!(
                    "Nothing to play on channel {} for user {}",
                    channel_id, user_id
                );
                self.users.release(user_id, slot).await;
                return Ok(StartOutcome::NothingToPlay {
                    channel_id: channel_id.to_string(),
                    feed_url: self.source.feed_url(channel_id),
                });
            }
            QueueResolution::Failed(reason) => {
                warn!(
                    "Queue resolution failed for channel {} (user {}): {}",
                    channel_id, user_id, reason
                );
                self.users.release(user_id, slot).await;
                return Err(BoostError::Resolution(reason));
            }
        };

        let _guard = slot.lock().await;
        if slot.generation() != generation {
            info!(
                "Discarding resolved queue of channel {} for user {}: superseded",
                channel_id, user_id
            );
            return Ok(StartOutcome::Superseded);
        }

        self.store
            .ensure_channel(NewChannel::unverified(channel_id))
            .await?;

        let entries = queue_entries(user_id, &items);
        let now = Utc::now().naive_utc();
        let session = self
            .store
            .replace_session(
                NewBoostingSession {
                    user_id,
                    channel_id: channel_id.to_string(),
                    start_time: now,
                    last_updated: now,
                    active_video_id: items.first().map(|item| item.video_id.clone()),
                    videos_watched: 0,
                },
                entries.clone(),
            )
            .await?;

        let snapshot = SessionSnapshot::from_parts(session, entries);
        metrics::SESSIONS_STARTED.inc();
        info!(
            "User {} started boosting channel {} with {} videos",
            user_id,
            channel_id,
            snapshot.queue.len()
        );
        self.bus.publish(BoostEvent::Started {
            user_id,
            channel_id: channel_id.to_string(),
            session: snapshot.clone(),
        });

        Ok(StartOutcome::Started(snapshot))
    }

    /// Stop the user's session. Returns whether one existed.
    pub async fn stop(&self, user_id: i32) -> Result<bool, BoostError> {
        validate_user(user_id)?;

        let slot = self.users.slot(user_id).await;
        let removed = {
            let _guard = slot.lock().await;
            slot.advance();
            self.remove_session(user_id).await?
        };
        if !removed {
            debug!("Stop requested for user {} without a session", user_id);
        }
        self.users.release(user_id, slot).await;
        Ok(removed)
    }

    /// Count the playing item and move to the next one.
    ///
    /// Reporting an item that was already counted in this session is a no-op.
    /// When the store fails after the session was advanced, the advancement is
    /// undone so the session looks as it did before the call.
    pub async fn report_completion(
        &self,
        user_id: i32,
        channel_id: Option<&str>,
        video_id: &str,
        observed_duration: i32,
    ) -> Result<CompletionOutcome, BoostError> {
        validate_user(user_id)?;
        let video_id = validate_id("video id", video_id)?;
        if observed_duration < 0 {
            return Err(BoostError::InvalidInput(format!(
                "view duration must not be negative, got {}",
                observed_duration
            )));
        }

        let slot = self.users.slot(user_id).await;
        let outcome = {
            let _guard = slot.lock().await;
            self.complete_playing(user_id, channel_id, video_id, observed_duration)
                .await
        };
        if matches!(
            outcome,
            Ok(CompletionOutcome::Finished { .. }) | Err(BoostError::NoActiveSession(_))
        ) {
            self.users.release(user_id, slot).await;
        }
        outcome
    }

    /// Body of [`Self::report_completion`]. Call with the user's lock held.
    async fn complete_playing(
        &self,
        user_id: i32,
        channel_id: Option<&str>,
        video_id: &str,
        observed_duration: i32,
    ) -> Result<CompletionOutcome, BoostError> {
        let session = self
            .store
            .get_session(user_id)
            .await?
            .ok_or(BoostError::NoActiveSession(user_id))?;

        if let Some(reported) = channel_id {
            if reported != session.channel_id {
                return Err(BoostError::ChannelMismatch {
                    user_id,
                    expected: session.channel_id.clone(),
                    actual: reported.to_string(),
                });
            }
        }

        let entries = self.store.get_queue(user_id).await?;
        let snapshot = SessionSnapshot::from_parts(session.clone(), entries.clone());
        let watched = session.videos_watched.max(0) as usize;

        let is_playing = snapshot
            .queue
            .get(watched)
            .is_some_and(|item| item.video_id == video_id);
        if !is_playing {
            return self.reject_completion(user_id, video_id, watched, snapshot);
        }

        let videos_watched = session.videos_watched + 1;
        let channel_id = session.channel_id.clone();

        match snapshot.queue.get(watched + 1) {
            Some(next) => {
                let updated = self
                    .store
                    .update_session_progress(user_id, Some(&next.video_id), videos_watched)
                    .await?;

                let view_stat = match self
                    .aggregator
                    .record_view(user_id, &channel_id, video_id, observed_duration)
                    .await
                {
                    Ok(stat) => stat,
                    Err(e) => {
                        self.rollback_progress(&session).await;
                        return Err(e);
                    }
                };

                let snapshot = SessionSnapshot::from_parts(updated, entries);
                debug!(
                    "User {} finished video {}, now playing {}",
                    user_id, video_id, next.video_id
                );
                self.bus.publish(BoostEvent::ViewCounted {
                    user_id,
                    channel_id,
                    video_id: video_id.to_string(),
                    session: snapshot.clone(),
                });

                Ok(CompletionOutcome::Counted {
                    view_stat,
                    session: snapshot,
                })
            }
            None => {
                self.store.delete_session(user_id).await?;

                let view_stat = match self
                    .aggregator
                    .record_view(user_id, &channel_id, video_id, observed_duration)
                    .await
                {
                    Ok(stat) => stat,
                    Err(e) => {
                        self.restore_session(&session, entries).await;
                        return Err(e);
                    }
                };

                metrics::SESSIONS_FINISHED.inc();
                info!(
                    "User {} finished boosting channel {} after {} videos",
                    user_id, channel_id, videos_watched
                );
                self.bus.publish(BoostEvent::Finished {
                    user_id,
                    channel_id: channel_id.clone(),
                    videos_watched,
                });

                Ok(CompletionOutcome::Finished {
                    view_stat,
                    channel_id,
                    videos_watched,
                })
            }
        }
    }

    /// Session and queue of the user with statuses reconstructed from progress
    pub async fn current(&self, user_id: i32) -> Result<SessionSnapshot, BoostError> {
        validate_user(user_id)?;

        let slot = self.users.slot(user_id).await;
        let snapshot = {
            let _guard = slot.lock().await;
            self.load_snapshot(user_id).await
        };
        if matches!(snapshot, Err(BoostError::NoActiveSession(_))) {
            self.users.release(user_id, slot).await;
        }
        snapshot
    }

    async fn load_snapshot(&self, user_id: i32) -> Result<SessionSnapshot, BoostError> {
        let session = self
            .store
            .get_session(user_id)
            .await?
            .ok_or(BoostError::NoActiveSession(user_id))?;
        let entries = self.store.get_queue(user_id).await?;

        Ok(SessionSnapshot::from_parts(session, entries))
    }

    /// Resolve a channel's queue without touching any session
    pub async fn preview_queue(&self, channel_id: &str) -> Result<Vec<PlayableItem>, BoostError> {
        let channel_id = validate_id("channel id", channel_id)?;

        match self.source.resolve_queue(channel_id).await {
            QueueResolution::Items(items) if !items.is_empty() => Ok(items),
            QueueResolution::Items(_) | QueueResolution::Empty => Err(BoostError::NotFound(
                format!("playable videos for channel {}", channel_id),
            )),
            QueueResolution::Failed(reason) => Err(BoostError::Resolution(reason)),
        }
    }

    /// Delete the session and announce it. Call with the user's lock held.
    async fn remove_session(&self, user_id: i32) -> Result<bool, BoostError> {
        let Some(session) = self.store.get_session(user_id).await? else {
            return Ok(false);
        };
        if !self.store.delete_session(user_id).await? {
            return Ok(false);
        }

        metrics::SESSIONS_STOPPED.inc();
        info!(
            "Stopped boosting session of user {} on channel {}",
            user_id, session.channel_id
        );
        self.bus.publish(BoostEvent::Stopped {
            user_id,
            channel_id: session.channel_id,
        });
        Ok(true)
    }

    fn reject_completion(
        &self,
        user_id: i32,
        video_id: &str,
        watched: usize,
        snapshot: SessionSnapshot,
    ) -> Result<CompletionOutcome, BoostError> {
        let counted = watched.min(snapshot.queue.len());
        if snapshot.queue[..counted]
            .iter()
            .any(|item| item.video_id == video_id)
        {
            metrics::DUPLICATE_COMPLETIONS.inc();
            info!(
                "Ignoring repeated completion of video {} for user {}",
                video_id, user_id
            );
            return Ok(CompletionOutcome::Duplicate { session: snapshot });
        }

        if snapshot.queue.iter().any(|item| item.video_id == video_id) {
            return Err(BoostError::ItemNotPlaying {
                user_id,
                video_id: video_id.to_string(),
            });
        }

        Err(BoostError::UnknownItem {
            user_id,
            video_id: video_id.to_string(),
        })
    }

    async fn rollback_progress(&self, session: &BoostingSession) {
        if let Err(e) = self
            .store
            .update_session_progress(
                session.user_id,
                session.active_video_id.as_deref(),
                session.videos_watched,
            )
            .await
        {
            error!(
                "Failed to roll back progress of user {} to {} videos: {}",
                session.user_id, session.videos_watched, e
            );
        }
    }

    async fn restore_session(&self, session: &BoostingSession, entries: Vec<QueueEntry>) {
        if let Err(e) = self
            .store
            .replace_session(NewBoostingSession::from(session), entries)
            .await
        {
            error!(
                "Failed to restore session of user {} on channel {}: {}",
                session.user_id, session.channel_id, e
            );
        }
    }
}

fn queue_entries(user_id: i32, items: &[PlayableItem]) -> Vec<QueueEntry> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| item.to_entry(user_id, position))
        .collect()
}

fn validate_user(user_id: i32) -> Result<(), BoostError> {
    if user_id <= 0 {
        return Err(BoostError::InvalidInput(format!(
            "user id must be positive, got {}",
            user_id
        )));
    }
    Ok(())
}

fn validate_id<'a>(what: &str, value: &'a str) -> Result<&'a str, BoostError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BoostError::InvalidInput(format!("{} must not be empty", what)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use tracing_test::traced_test;

    struct FixedSource(QueueResolution);

    #[async_trait]
    impl VideoSource for FixedSource {
        async fn resolve_queue(&self, _: &str) -> QueueResolution {
            self.0.clone()
        }

        fn feed_url(&self, channel_id: &str) -> Option<String> {
            Some(format!("feed://{}", channel_id))
        }
    }

    fn manager(resolution: QueueResolution) -> (BoostingSessionManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let aggregator = Arc::new(ViewCountAggregator::new(store.clone()));
        let manager = BoostingSessionManager::new(
            store.clone(),
            Arc::new(FixedSource(resolution)),
            aggregator,
            NotificationBus::new(16),
        );
        (manager, store)
    }

    fn items(ids: &[&str]) -> QueueResolution {
        QueueResolution::Items(
            ids.iter()
                .map(|id| PlayableItem::queued(*id, format!("Video {}", id), 60))
                .collect(),
        )
    }

    #[tokio::test]
    async fn rejects_invalid_input() {
        let (manager, _) = manager(items(&["a"]));
        assert!(matches!(
            manager.start(0, "UC1").await,
            Err(BoostError::InvalidInput(_))
        ));
        assert!(matches!(
            manager.start(1, "  ").await,
            Err(BoostError::InvalidInput(_))
        ));
        assert!(matches!(
            manager.report_completion(1, None, "a", -1).await,
            Err(BoostError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn empty_resolution_offers_feed_without_session() {
        let (manager, store) = manager(QueueResolution::Empty);
        let outcome = manager.start(1, "UC1").await.unwrap();
        assert_eq!(
            outcome,
            StartOutcome::NothingToPlay {
                channel_id: "UC1".into(),
                feed_url: Some("feed://UC1".into()),
            }
        );
        assert!(store.get_session(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_resolution_surfaces_reason() {
        let (manager, store) = manager(QueueResolution::Failed("quota".into()));
        match manager.start(1, "UC1").await {
            Err(BoostError::Resolution(reason)) => assert_eq!(reason, "quota"),
            other => panic!("expected resolution error, got {:?}", other),
        }
        assert!(store.get_session(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_channel_is_created_unverified() {
        let (manager, store) = manager(items(&["a"]));
        manager.start(1, "UCnew").await.unwrap();
        let channel = store.get_channel("UCnew").await.unwrap().unwrap();
        assert_eq!(channel.name, "UCnew");
        assert!(!channel.is_verified);
    }

    #[tokio::test]
    async fn completion_order_is_enforced() {
        let (manager, _) = manager(items(&["a", "b", "c"]));
        manager.start(1, "UC1").await.unwrap();

        assert!(matches!(
            manager.report_completion(1, None, "c", 40).await,
            Err(BoostError::ItemNotPlaying { .. })
        ));
        assert!(matches!(
            manager.report_completion(1, None, "zzz", 40).await,
            Err(BoostError::UnknownItem { .. })
        ));
        assert!(matches!(
            manager.report_completion(1, Some("UC2"), "a", 40).await,
            Err(BoostError::ChannelMismatch { .. })
        ));

        let snapshot = manager.current(1).await.unwrap();
        assert_eq!(snapshot.session.videos_watched, 0);
    }

    #[traced_test]
    #[tokio::test]
    async fn duplicate_completion_is_logged_and_ignored() {
        let (manager, store) = manager(items(&["a", "b"]));
        manager.start(2, "UC1").await.unwrap();
        manager.report_completion(2, None, "a", 40).await.unwrap();

        let outcome = manager.report_completion(2, None, "a", 40).await.unwrap();
        assert!(matches!(outcome, CompletionOutcome::Duplicate { .. }));
        assert_eq!(store.view_stats_for_user(2).await.unwrap().len(), 1);
        assert!(logs_contain("Ignoring repeated completion of video a for user 2"));
    }

    #[tokio::test]
    async fn idle_users_do_not_keep_lock_slots() {
        let (busy, _) = manager(items(&["a"]));

        busy.start(1, "UC1").await.unwrap();
        busy.start(2, "UC1").await.unwrap();
        assert_eq!(busy.users.tracked().await, 2);

        busy.report_completion(1, None, "a", 30).await.unwrap();
        busy.stop(2).await.unwrap();
        assert!(busy.current(3).await.is_err());
        assert_eq!(busy.users.tracked().await, 0);

        let (empty, _) = manager(QueueResolution::Empty);
        empty.start(5, "UC1").await.unwrap();
        assert_eq!(empty.users.tracked().await, 0);
    }

    #[tokio::test]
    async fn start_outcome_serializes_with_outcome_tag() {
        let (manager, _) = manager(items(&["a"]));
        let outcome = manager.start(4, "UC1").await.unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "started");
        assert_eq!(json["userId"], 4);
        assert_eq!(json["activeVideoId"], "a");
        assert_eq!(json["queue"][0]["status"], "playing");

        let json = serde_json::to_value(StartOutcome::Superseded).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "superseded"}));
    }
}
