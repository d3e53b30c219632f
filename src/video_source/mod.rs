// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Resolution of a channel into an ordered, finite queue of playable videos.
//!
//! The primary path walks the channel's uploads collection page by page and
//! fetches durations in batches. Any failure along the way, or an empty
//! collection, switches to a direct search over the channel. The outcome is
//! always one of the three [`QueueResolution`] variants so callers never have
//! to guess whether an empty list meant "nothing there" or "could not look".

mod duration;
mod youtube;

pub use duration::parse_duration;
pub use youtube::YouTubeApi;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::VideoSourceConfig;
use crate::metrics;
use crate::models::PlayableItem;

/// Result of resolving a channel into a playback queue
#[derive(Debug, Clone, PartialEq)]
pub enum QueueResolution {
    /// Playable items in platform order, never empty
    Items(Vec<PlayableItem>),
    /// Every strategy ran and found nothing to play
    Empty,
    /// No strategy could run to completion
    Failed(String),
}

#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn resolve_queue(&self, channel_id: &str) -> QueueResolution;

    /// Passive playback listing for the channel, offered when nothing can be queued
    fn feed_url(&self, _channel_id: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("platform API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("platform API key is not configured")]
    NotConfigured,
}

/// Video reference before its duration is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStub {
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionPage {
    pub items: Vec<ItemStub>,
    pub next_page_token: Option<String>,
}

/// The calls the resolver needs from the video platform
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Canonical uploads collection of the channel, `None` if the channel is unknown
    async fn uploads_collection(&self, channel_id: &str) -> Result<Option<String>, SourceError>;

    async fn collection_page(
        &self,
        collection_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<CollectionPage, SourceError>;

    async fn search_channel_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<ItemStub>, SourceError>;

    /// Raw duration strings keyed by video id; ids the platform does not know are absent
    async fn durations(&self, video_ids: &[String]) -> Result<HashMap<String, String>, SourceError>;

    fn feed_url(&self, _channel_id: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    pub page_size: u32,
    pub max_items: usize,
    pub default_duration: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        (&VideoSourceConfig::default()).into()
    }
}

impl From<&VideoSourceConfig> for ResolverSettings {
    fn from(config: &VideoSourceConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            max_items: config.max_items.max(1),
            default_duration: config.default_duration_secs,
        }
    }
}

/// Uploads-collection resolver with search fallback
pub struct FallbackVideoSource<A> {
    api: A,
    settings: ResolverSettings,
}

impl<A: PlatformApi> FallbackVideoSource<A> {
    pub fn new(api: A, settings: ResolverSettings) -> Self {
        Self { api, settings }
    }

    /// Walk the uploads collection. An `Err` carries the reason to fall back.
    async fn resolve_uploads(&self, channel_id: &str) -> Result<Vec<PlayableItem>, String> {
        let collection_id = match self.api.uploads_collection(channel_id).await {
            Ok(Some(id)) => id,
            Ok(None) => return Err(format!("channel {} not found", channel_id)),
            Err(e) => return Err(format!("channel lookup failed: {}", e)),
        };
        debug!("Uploads collection for {}: {}", channel_id, collection_id);

        let mut stubs: Vec<ItemStub> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .api
                .collection_page(&collection_id, page_token.as_deref(), self.settings.page_size)
                .await
                .map_err(|e| format!("collection paging failed: {}", e))?;

            if page.items.is_empty() {
                break;
            }
            stubs.extend(page.items);

            if stubs.len() >= self.settings.max_items {
                break;
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        if stubs.is_empty() {
            return Err(format!("uploads collection {} is empty", collection_id));
        }
        stubs.truncate(self.settings.max_items);

        Ok(self.attach_durations(stubs).await)
    }

    async fn resolve_by_search(&self, channel_id: &str) -> Result<Vec<PlayableItem>, SourceError> {
        let max_results = u32::try_from(self.settings.max_items).unwrap_or(u32::MAX);
        let mut stubs = self.api.search_channel_videos(channel_id, max_results).await?;
        stubs.retain(|stub| !stub.video_id.is_empty());
        stubs.truncate(self.settings.max_items);

        if stubs.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.attach_durations(stubs).await)
    }

    /// Zip stubs with their durations. Lookup failures fall back to the default.
    async fn attach_durations(&self, stubs: Vec<ItemStub>) -> Vec<PlayableItem> {
        let ids: Vec<String> = stubs.iter().map(|stub| stub.video_id.clone()).collect();
        let durations = match self.api.durations(&ids).await {
            Ok(durations) => durations,
            Err(e) => {
                warn!(
                    "Duration lookup failed for {} videos, using {}s: {}",
                    ids.len(),
                    self.settings.default_duration,
                    e
                );
                HashMap::new()
            }
        };

        stubs
            .into_iter()
            .map(|stub| {
                let duration = durations
                    .get(&stub.video_id)
                    .and_then(|raw| parse_duration(raw))
                    .unwrap_or(self.settings.default_duration);
                PlayableItem {
                    thumbnail_url: stub.thumbnail_url,
                    ..PlayableItem::queued(stub.video_id, stub.title, duration)
                }
            })
            .collect()
    }
}

#[async_trait]
impl<A: PlatformApi> VideoSource for FallbackVideoSource<A> {
    async fn resolve_queue(&self, channel_id: &str) -> QueueResolution {
        let reason = match self.resolve_uploads(channel_id).await {
            Ok(items) => {
                info!("Resolved {} videos for channel {}", items.len(), channel_id);
                return QueueResolution::Items(items);
            }
            Err(reason) => reason,
        };

        warn!(
            "Primary resolution failed for channel {} ({}), falling back to search",
            channel_id, reason
        );
        metrics::RESOLUTION_FALLBACKS.inc();

        match self.resolve_by_search(channel_id).await {
            Ok(items) if items.is_empty() => {
                info!("No playable videos found for channel {}", channel_id);
                metrics::RESOLUTION_EMPTY.inc();
                QueueResolution::Empty
            }
            Ok(items) => {
                info!(
                    "Resolved {} videos for channel {} via search",
                    items.len(),
                    channel_id
                );
                QueueResolution::Items(items)
            }
            Err(e) => QueueResolution::Failed(format!("{}; search fallback failed: {}", reason, e)),
        }
    }

    fn feed_url(&self, channel_id: &str) -> Option<String> {
        self.api.feed_url(channel_id)
    }
}
