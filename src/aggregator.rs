// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! View recording and the statistics derived from it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::BoostError;
use crate::metrics;
use crate::models::{
    ChannelViews, DeviceViewMetrics, GeoViewMetrics, GeoViewStat, NewGeoViewStat, NewViewStat,
    UserStats, ViewStat,
};
use crate::store::SessionStore;

const UNKNOWN: &str = "Unknown";

pub struct ViewCountAggregator {
    store: Arc<dyn SessionStore>,
}

impl ViewCountAggregator {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Append one view. Callers decide whether the view should count.
    pub async fn record_view(
        &self,
        user_id: i32,
        channel_id: &str,
        video_id: &str,
        view_duration: i32,
    ) -> Result<ViewStat, BoostError> {
        let stat = self
            .store
            .insert_view_stat(NewViewStat {
                user_id,
                channel_id: channel_id.to_string(),
                video_id: video_id.to_string(),
                view_duration,
            })
            .await?;

        metrics::VIEWS_RECORDED.inc();
        info!(
            "Recorded view {} of video {} on channel {} for user {} ({}s)",
            stat.id, video_id, channel_id, user_id, view_duration
        );
        Ok(stat)
    }

    /// Attach location and device details to a view the same user recorded
    pub async fn record_geo_view(&self, mut geo: NewGeoViewStat) -> Result<GeoViewStat, BoostError> {
        let view = self
            .store
            .get_view_stat(geo.view_stat_id)
            .await?
            .ok_or_else(|| BoostError::NotFound(format!("view stat {}", geo.view_stat_id)))?;

        if view.user_id != geo.user_id {
            return Err(BoostError::InvalidInput(format!(
                "view stat {} does not belong to user {}",
                view.id, geo.user_id
            )));
        }
        if geo.channel_id.is_empty() {
            geo.channel_id = view.channel_id.clone();
        } else if geo.channel_id != view.channel_id {
            return Err(BoostError::InvalidInput(format!(
                "view stat {} was recorded on channel {}, not {}",
                view.id, view.channel_id, geo.channel_id
            )));
        }

        let stat = self.store.insert_geo_view_stat(geo).await?;
        debug!("Recorded geo stat {} for view {}", stat.id, stat.view_stat_id);
        Ok(stat)
    }

    pub async fn compute_user_stats(&self, user_id: i32) -> Result<UserStats, BoostError> {
        let stats = self.store.view_stats_for_user(user_id).await?;

        let mut names = HashMap::new();
        for channel_id in distinct_channels(&stats) {
            if let Some(channel) = self.store.get_channel(&channel_id).await? {
                names.insert(channel_id, channel.name);
            }
        }

        Ok(summarize_views(&stats, &names))
    }

    pub async fn compute_geo_metrics(&self, user_id: i32) -> Result<Vec<GeoViewMetrics>, BoostError> {
        let stats = self.store.geo_view_stats_for_user(user_id).await?;
        Ok(group_by_country(&stats))
    }

    pub async fn compute_device_metrics(
        &self,
        user_id: i32,
    ) -> Result<Vec<DeviceViewMetrics>, BoostError> {
        let stats = self.store.geo_view_stats_for_user(user_id).await?;
        Ok(group_by_device(&stats))
    }
}

/// Rounded share of `count` in `total`; zero when there is nothing to share
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 * 100.0) / total as f64).round() as u32
}

fn distinct_channels(stats: &[ViewStat]) -> Vec<String> {
    let mut ids: Vec<String> = stats.iter().map(|s| s.channel_id.clone()).collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Totals and per-channel breakdown, sorted by views descending.
/// Unknown channels are labelled with their raw id.
pub fn summarize_views(stats: &[ViewStat], channel_names: &HashMap<String, String>) -> UserStats {
    let total_views = stats.len();
    if total_views == 0 {
        return UserStats::default();
    }

    let session_time = stats.iter().map(|s| i64::from(s.view_duration)).sum();

    let mut per_channel: BTreeMap<&str, usize> = BTreeMap::new();
    for stat in stats {
        *per_channel.entry(stat.channel_id.as_str()).or_default() += 1;
    }

    let mut views_by_channel: Vec<ChannelViews> = per_channel
        .into_iter()
        .map(|(channel_id, views)| ChannelViews {
            channel_id: channel_id.to_string(),
            channel_name: channel_names
                .get(channel_id)
                .cloned()
                .unwrap_or_else(|| channel_id.to_string()),
            views,
            percentage: percentage(views, total_views),
        })
        .collect();
    // BTreeMap order breaks ties by channel id
    views_by_channel.sort_by(|a, b| b.views.cmp(&a.views));

    UserStats {
        total_views,
        channels_supported: views_by_channel.len(),
        session_time,
        views_by_channel,
    }
}

pub fn group_by_country(stats: &[GeoViewStat]) -> Vec<GeoViewMetrics> {
    let total = stats.len();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for stat in stats {
        let country = stat.country.clone().unwrap_or_else(|| UNKNOWN.to_string());
        *counts.entry(country).or_default() += 1;
    }

    let mut metrics: Vec<GeoViewMetrics> = counts
        .into_iter()
        .map(|(country, count)| GeoViewMetrics {
            country,
            count,
            percentage: percentage(count, total),
        })
        .collect();
    metrics.sort_by(|a, b| b.count.cmp(&a.count));
    metrics
}

pub fn group_by_device(stats: &[GeoViewStat]) -> Vec<DeviceViewMetrics> {
    let total = stats.len();
    let mut counts: BTreeMap<(String, Option<String>), usize> = BTreeMap::new();
    for stat in stats {
        let device = stat
            .device_type
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string());
        *counts.entry((device, stat.browser.clone())).or_default() += 1;
    }

    let mut metrics: Vec<DeviceViewMetrics> = counts
        .into_iter()
        .map(|((device_type, browser), count)| DeviceViewMetrics {
            device_type,
            browser,
            count,
            percentage: percentage(count, total),
        })
        .collect();
    metrics.sort_by(|a, b| b.count.cmp(&a.count));
    metrics
}
