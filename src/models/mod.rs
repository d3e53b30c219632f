// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod boosting;
pub mod calendar;
pub mod channel;
pub mod geo;
pub mod recommendation;
pub mod statistics;
pub mod view_stat;

pub use boosting::{
    BoostingSession, ItemStatus, NewBoostingSession, PlayableItem, QueueEntry,
    SessionSnapshot,
};
pub use calendar::{CalendarEventView, CalendarStatus, ContentCalendarEvent, NewCalendarEvent, UpdateCalendarEvent};
pub use channel::{Channel, NewChannel};
pub use geo::{GeoViewStat, NewGeoViewStat};
pub use recommendation::{ChannelImpactScore, ChannelRecommendation, NewChannelRecommendation};
pub use statistics::{ChannelViews, DeviceViewMetrics, GeoViewMetrics, UserStats};
pub use view_stat::{NewViewStat, ViewStat};
