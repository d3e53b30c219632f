// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::view_stats;

/// One counted view. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = view_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct ViewStat {
    pub id: i32,
    pub user_id: i32,
    pub channel_id: String,
    pub video_id: String,
    /// Seconds of playback reported by the observer
    pub view_duration: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = view_stats)]
#[serde(rename_all = "camelCase")]
pub struct NewViewStat {
    pub user_id: i32,
    pub channel_id: String,
    pub video_id: String,
    pub view_duration: i32,
}
