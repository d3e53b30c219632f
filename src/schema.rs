// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

// Import diesel table macros
use diesel::allow_tables_to_appear_in_same_query;
use diesel::table;

table! {
    channels (id) {
        id -> Integer,
        channel_id -> Varchar,
        name -> Varchar,
        description -> Nullable<Text>,
        thumbnail_url -> Nullable<Varchar>,
        banner_url -> Nullable<Varchar>,
        category -> Nullable<Varchar>,
        is_verified -> Bool,
        created_at -> Timestamp,
    }
}

// One row per user at most (unique user_id)
table! {
    current_boosting (id) {
        id -> Integer,
        user_id -> Integer,
        channel_id -> Varchar,
        start_time -> Timestamp,
        last_updated -> Timestamp,
        active_video_id -> Nullable<Varchar>,
        videos_watched -> Integer,
    }
}

// Resolved queue of the session owned by user_id, in playback order
table! {
    boosting_queue_items (user_id, position) {
        user_id -> Integer,
        position -> Integer,
        video_id -> Varchar,
        title -> Varchar,
        duration -> Integer,
        thumbnail_url -> Nullable<Varchar>,
    }
}

table! {
    view_stats (id) {
        id -> Integer,
        user_id -> Integer,
        channel_id -> Varchar,
        video_id -> Varchar,
        view_duration -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    geo_view_stats (id) {
        id -> Integer,
        view_stat_id -> Integer,
        user_id -> Integer,
        channel_id -> Varchar,
        country -> Nullable<Varchar>,
        region -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        ip_address -> Nullable<Varchar>,
        device_type -> Nullable<Varchar>,
        browser -> Nullable<Varchar>,
        created_at -> Timestamp,
    }
}

table! {
    content_calendar (id) {
        id -> Integer,
        user_id -> Integer,
        title -> Varchar,
        description -> Nullable<Text>,
        scheduled_date -> Timestamp,
        channel_id -> Varchar,
        video_ids -> Nullable<Array<Text>>,
        status -> Varchar,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    channel_recommendations (id) {
        id -> Integer,
        user_id -> Integer,
        channel_id -> Varchar,
        impact_score -> Float4,
        views_potential -> Integer,
        views_actual -> Integer,
        category -> Nullable<Varchar>,
        recommendation_date -> Timestamp,
        last_engaged -> Nullable<Timestamp>,
    }
}

allow_tables_to_appear_in_same_query!(
    channels,
    current_boosting,
    boosting_queue_items,
    view_stats,
    geo_view_stats,
    content_calendar,
    channel_recommendations,
);
