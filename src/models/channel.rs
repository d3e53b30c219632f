// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::channels;

/// A content source that can be boosted
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = channels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: i32,
    /// Platform-assigned identifier
    pub channel_id: String,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub banner_url: Option<String>,
    pub category: Option<String>,
    pub is_verified: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = channels)]
#[serde(rename_all = "camelCase")]
pub struct NewChannel {
    pub channel_id: String,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub banner_url: Option<String>,
    pub category: Option<String>,
    pub is_verified: bool,
}

impl NewChannel {
    /// Placeholder record for a channel first seen through a boosting request
    pub fn unverified(channel_id: &str) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            name: channel_id.to_string(),
            description: None,
            thumbnail_url: None,
            banner_url: None,
            category: None,
            is_verified: false,
        }
    }
}
