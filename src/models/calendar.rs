// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::channel::Channel;
use crate::schema::content_calendar;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = content_calendar)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct ContentCalendarEvent {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: NaiveDateTime,
    pub channel_id: String,
    pub video_ids: Option<Vec<String>>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = content_calendar)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarEvent {
    pub user_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub scheduled_date: NaiveDateTime,
    pub channel_id: String,
    #[serde(default)]
    pub video_ids: Option<Vec<String>>,
    #[serde(default = "default_status")]
    pub status: String,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = content_calendar)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCalendarEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_date: Option<NaiveDateTime>,
    pub channel_id: Option<String>,
    pub video_ids: Option<Vec<String>>,
    pub status: Option<String>,
}

impl UpdateCalendarEvent {
    pub fn apply_to(self, event: &mut ContentCalendarEvent) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = Some(description);
        }
        if let Some(scheduled_date) = self.scheduled_date {
            event.scheduled_date = scheduled_date;
        }
        if let Some(channel_id) = self.channel_id {
            event.channel_id = channel_id;
        }
        if let Some(video_ids) = self.video_ids {
            event.video_ids = Some(video_ids);
        }
        if let Some(status) = self.status {
            event.status = status;
        }
    }
}

fn default_status() -> String {
    CalendarStatus::Scheduled.to_string()
}

/// Allowed values of a calendar event's `status` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl CalendarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarStatus::Scheduled => "scheduled",
            CalendarStatus::InProgress => "in-progress",
            CalendarStatus::Completed => "completed",
            CalendarStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for CalendarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(CalendarStatus::Scheduled),
            "in-progress" => Ok(CalendarStatus::InProgress),
            "completed" => Ok(CalendarStatus::Completed),
            "cancelled" => Ok(CalendarStatus::Cancelled),
            other => Err(format!("unknown calendar status: {}", other)),
        }
    }
}

/// Calendar entry as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventView {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: NaiveDateTime,
    pub channel_name: String,
    pub channel_id: String,
    pub thumbnail_url: Option<String>,
    pub video_count: usize,
    pub status: String,
}

impl CalendarEventView {
    pub fn new(event: ContentCalendarEvent, channel: Option<&Channel>) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            scheduled_date: event.scheduled_date,
            channel_name: channel
                .map(|c| c.name.clone())
                .unwrap_or_else(|| event.channel_id.clone()),
            thumbnail_url: channel.and_then(|c| c.thumbnail_url.clone()),
            video_count: event.video_ids.as_ref().map(Vec::len).unwrap_or(0),
            channel_id: event.channel_id,
            status: event.status,
        }
    }
}
