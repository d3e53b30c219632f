// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod aggregator;
pub mod api;
pub mod boosting;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod schema;
pub mod seed;
pub mod store;
pub mod video_source;

#[macro_use]
extern crate diesel;
