// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::channel::Channel;
use crate::schema::channel_recommendations;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = channel_recommendations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecommendation {
    pub id: i32,
    pub user_id: i32,
    pub channel_id: String,
    pub impact_score: f32,
    pub views_potential: i32,
    pub views_actual: i32,
    pub category: Option<String>,
    pub recommendation_date: NaiveDateTime,
    pub last_engaged: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = channel_recommendations)]
#[serde(rename_all = "camelCase")]
pub struct NewChannelRecommendation {
    pub user_id: i32,
    pub channel_id: String,
    pub impact_score: f32,
    pub views_potential: i32,
    #[serde(default)]
    pub views_actual: i32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub last_engaged: Option<NaiveDateTime>,
}

/// Recommendation joined with what is known about its channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelImpactScore {
    pub id: i32,
    pub channel_id: String,
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub impact_score: f32,
    pub views_potential: i32,
    pub views_generated: i32,
    pub category: String,
    pub description: Option<String>,
    pub banner_url: Option<String>,
}

impl ChannelImpactScore {
    pub fn new(rec: ChannelRecommendation, channel: Option<&Channel>) -> Self {
        let category = rec
            .category
            .clone()
            .or_else(|| channel.and_then(|c| c.category.clone()))
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            id: rec.id,
            name: channel
                .map(|c| c.name.clone())
                .unwrap_or_else(|| rec.channel_id.clone()),
            thumbnail_url: channel.and_then(|c| c.thumbnail_url.clone()),
            impact_score: rec.impact_score,
            views_potential: rec.views_potential,
            views_generated: rec.views_actual,
            category,
            description: channel.and_then(|c| c.description.clone()),
            banner_url: channel.and_then(|c| c.banner_url.clone()),
            channel_id: rec.channel_id,
        }
    }
}
