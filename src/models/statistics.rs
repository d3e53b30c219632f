// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Per-user summary derived from view stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_views: usize,
    pub channels_supported: usize,
    /// Sum of recorded view durations in seconds
    pub session_time: i64,
    pub views_by_channel: Vec<ChannelViews>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelViews {
    pub channel_id: String,
    pub channel_name: String,
    pub views: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoViewMetrics {
    pub country: String,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceViewMetrics {
    pub device_type: String,
    pub browser: Option<String>,
    pub count: usize,
    pub percentage: u32,
}
