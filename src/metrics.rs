// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

fn register_counter(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::with_opts(Opts::new(name, help))
        .expect("counter name and help are static and valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("counter is registered once");
    counter
}

pub static SESSIONS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    register_counter("booster_sessions_started_total", "Boosting sessions started")
});

pub static SESSIONS_FINISHED: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "booster_sessions_finished_total",
        "Boosting sessions that played their whole queue",
    )
});

pub static SESSIONS_STOPPED: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "booster_sessions_stopped_total",
        "Boosting sessions removed by a stop or restart",
    )
});

pub static VIEWS_RECORDED: Lazy<IntCounter> = Lazy::new(|| {
    register_counter("booster_views_recorded_total", "View stats appended")
});

pub static DUPLICATE_COMPLETIONS: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "booster_duplicate_completions_total",
        "Completion reports ignored because the item was already counted",
    )
});

pub static RESOLUTION_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "booster_resolution_fallbacks_total",
        "Queue resolutions that switched to search",
    )
});

pub static RESOLUTION_EMPTY: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "booster_resolution_empty_total",
        "Queue resolutions that found nothing to play",
    )
});

/// Force registration so every counter shows up in the first scrape
pub fn init() {
    Lazy::force(&SESSIONS_STARTED);
    Lazy::force(&SESSIONS_FINISHED);
    Lazy::force(&SESSIONS_STOPPED);
    Lazy::force(&VIEWS_RECORDED);
    Lazy::force(&DUPLICATE_COMPLETIONS);
    Lazy::force(&RESOLUTION_FALLBACKS);
    Lazy::force(&RESOLUTION_EMPTY);
}

/// Render the registry in the text exposition format
pub fn gather_text() -> Result<String, prometheus::Error> {
    init();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
