// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{CollectionPage, ItemStub, PlatformApi, SourceError};
use crate::config::VideoSourceConfig;

/// The videos endpoint accepts at most this many ids per call
const MAX_IDS_PER_LOOKUP: usize = 50;

/// Data API v3 client
pub struct YouTubeApi {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl YouTubeApi {
    pub fn new(config: &VideoSourceConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `{base}/{resource}` with the API key attached and decode the body
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let api_key = self.api_key.as_deref().ok_or(SourceError::NotConfigured)?;
        let url = format!("{}/{}", self.base_url, resource);

        let resp = self
            .http
            .get(&url)
            .query(query)
            .query(&[("key", api_key)])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PlatformApi for YouTubeApi {
    async fn uploads_collection(&self, channel_id: &str) -> Result<Option<String>, SourceError> {
        let resp: ChannelListResponse = self
            .get_json(
                "channels",
                &[
                    ("part", "contentDetails".to_string()),
                    ("id", channel_id.to_string()),
                ],
            )
            .await?;

        Ok(resp.uploads_playlist())
    }

    async fn collection_page(
        &self,
        collection_id: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<CollectionPage, SourceError> {
        let mut query = vec![
            ("part", "snippet,contentDetails".to_string()),
            ("playlistId", collection_id.to_string()),
            ("maxResults", page_size.min(50).to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let resp: PlaylistItemListResponse = self.get_json("playlistItems", &query).await?;
        debug!(
            "Fetched {} items from collection {}",
            resp.items.len(),
            collection_id
        );
        Ok(resp.into())
    }

    async fn search_channel_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<ItemStub>, SourceError> {
        let resp: SearchListResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet".to_string()),
                    ("channelId", channel_id.to_string()),
                    ("type", "video".to_string()),
                    ("order", "date".to_string()),
                    ("maxResults", max_results.min(50).to_string()),
                ],
            )
            .await?;

        Ok(resp.into_stubs())
    }

    async fn durations(&self, video_ids: &[String]) -> Result<HashMap<String, String>, SourceError> {
        let mut durations = HashMap::with_capacity(video_ids.len());

        for chunk in video_ids.chunks(MAX_IDS_PER_LOOKUP) {
            let resp: VideoListResponse = self
                .get_json(
                    "videos",
                    &[
                        ("part", "contentDetails".to_string()),
                        ("id", chunk.join(",")),
                    ],
                )
                .await?;

            durations.extend(
                resp.items
                    .into_iter()
                    .map(|video| (video.id, video.content_details.duration)),
            );
        }

        Ok(durations)
    }

    fn feed_url(&self, channel_id: &str) -> Option<String> {
        uploads_feed_url(channel_id)
    }
}

/// Uploads playlist of a `UC…` channel id is the same id with a `UU` prefix
fn uploads_feed_url(channel_id: &str) -> Option<String> {
    channel_id
        .strip_prefix("UC")
        .filter(|rest| !rest.is_empty())
        .map(|rest| format!("https://www.youtube.com/playlist?list=UU{}", rest))
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelResource>,
}

impl ChannelListResponse {
    fn uploads_playlist(self) -> Option<String> {
        self.items
            .into_iter()
            .next()
            .and_then(|channel| channel.content_details.related_playlists.uploads)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelResource {
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    #[serde(default)]
    items: Vec<PlaylistItemResource>,
    next_page_token: Option<String>,
}

impl From<PlaylistItemListResponse> for CollectionPage {
    fn from(resp: PlaylistItemListResponse) -> Self {
        CollectionPage {
            items: resp
                .items
                .into_iter()
                .map(|item| ItemStub {
                    video_id: item.content_details.video_id,
                    thumbnail_url: item.snippet.thumbnail_url(),
                    title: item.snippet.title,
                })
                .collect(),
            next_page_token: resp.next_page_token,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemResource {
    snippet: Snippet,
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    thumbnails: Option<Thumbnails>,
}

impl Snippet {
    fn thumbnail_url(&self) -> Option<String> {
        let thumbnails = self.thumbnails.as_ref()?;
        thumbnails
            .medium
            .as_ref()
            .or(thumbnails.default.as_ref())
            .map(|thumb| thumb.url.clone())
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

impl SearchListResponse {
    fn into_stubs(self) -> Vec<ItemStub> {
        self.items
            .into_iter()
            .filter_map(|result| {
                let video_id = result.id.video_id?;
                Some(ItemStub {
                    video_id,
                    thumbnail_url: result.snippet.thumbnail_url(),
                    title: result.snippet.title,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: SearchResultId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    content_details: VideoContentDetails,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: String,
}
