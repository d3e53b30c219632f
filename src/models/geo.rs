// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::geo_view_stats;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = geo_view_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct GeoViewStat {
    pub id: i32,
    pub view_stat_id: i32,
    pub user_id: i32,
    pub channel_id: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub ip_address: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Insertable, Serialize, Deserialize)]
#[diesel(table_name = geo_view_stats)]
#[serde(rename_all = "camelCase")]
pub struct NewGeoViewStat {
    pub view_stat_id: i32,
    pub user_id: i32,
    /// Filled in from the referenced view when left empty
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
}
