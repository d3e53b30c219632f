// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

mod common;

use std::sync::Arc;

use channel_booster::boosting::{CompletionOutcome, StartOutcome};
use channel_booster::error::BoostError;
use channel_booster::models::ItemStatus;
use channel_booster::notifications::BoostEvent;
use channel_booster::store::{MemoryStore, SessionStore};
use channel_booster::video_source::{FallbackVideoSource, QueueResolution, ResolverSettings};

use common::{app_state, items, stubs, FlakyStore, GatedSource, ScriptedSource, SearchOnlyPlatform};

fn event_type(event: &BoostEvent) -> String {
    serde_json::to_value(event).unwrap()["type"]
        .as_str()
        .unwrap()
        .to_string()
}

fn started(outcome: StartOutcome) -> channel_booster::models::SessionSnapshot {
    match outcome {
        StartOutcome::Started(snapshot) => snapshot,
        other => panic!("expected a started session, got {:?}", other),
    }
}

#[test_log::test(tokio::test)]
async fn full_queue_plays_through_and_finishes() {
    let store = Arc::new(MemoryStore::new());
    let source = ScriptedSource::new().with("UC1", QueueResolution::Items(items("a", 3)));
    let state = app_state(store.clone(), Arc::new(source));
    let mut events = state.bus.subscribe();

    let snapshot = started(state.manager.start(7, "UC1").await.unwrap());
    assert_eq!(snapshot.session.videos_watched, 0);
    assert_eq!(snapshot.session.active_video_id.as_deref(), Some("a-0"));
    assert_eq!(snapshot.queue[0].status, ItemStatus::Playing);
    assert_eq!(snapshot.queue[1].status, ItemStatus::Queued);

    match state.manager.report_completion(7, Some("UC1"), "a-0", 40).await.unwrap() {
        CompletionOutcome::Counted { view_stat, session } => {
            assert_eq!(view_stat.video_id, "a-0");
            assert_eq!(view_stat.view_duration, 40);
            assert_eq!(session.session.videos_watched, 1);
            assert_eq!(session.session.active_video_id.as_deref(), Some("a-1"));
            assert_eq!(session.queue[0].status, ItemStatus::Completed);
            assert_eq!(session.queue[1].status, ItemStatus::Playing);
        }
        other => panic!("expected counted, got {:?}", other),
    }

    state.manager.report_completion(7, None, "a-1", 35).await.unwrap();
    assert_eq!(state.manager.current(7).await.unwrap().session.videos_watched, 2);

    match state.manager.report_completion(7, None, "a-2", 31).await.unwrap() {
        CompletionOutcome::Finished {
            channel_id,
            videos_watched,
            ..
        } => {
            assert_eq!(channel_id, "UC1");
            assert_eq!(videos_watched, 3);
        }
        other => panic!("expected finished, got {:?}", other),
    }

    assert!(store.get_session(7).await.unwrap().is_none());
    assert!(matches!(
        state.manager.current(7).await,
        Err(BoostError::NoActiveSession(7))
    ));

    let stats = state.aggregator.compute_user_stats(7).await.unwrap();
    assert_eq!(stats.total_views, 3);
    assert_eq!(stats.session_time, 106);
    assert_eq!(stats.channels_supported, 1);
    assert_eq!(stats.views_by_channel[0].percentage, 100);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        assert_eq!(event.user_id(), 7);
        seen.push(event_type(&event));
    }
    assert_eq!(
        seen,
        vec!["started", "viewCounted", "viewCounted", "finished"]
    );
}

#[test_log::test(tokio::test)]
async fn repeated_completion_counts_once() {
    let store = Arc::new(MemoryStore::new());
    let source = ScriptedSource::new().with("UC1", QueueResolution::Items(items("a", 3)));
    let state = app_state(store.clone(), Arc::new(source));

    state.manager.start(1, "UC1").await.unwrap();
    state.manager.report_completion(1, None, "a-0", 40).await.unwrap();

    let again = state.manager.report_completion(1, None, "a-0", 40).await.unwrap();
    match again {
        CompletionOutcome::Duplicate { session } => {
            assert_eq!(session.session.videos_watched, 1);
        }
        other => panic!("expected duplicate, got {:?}", other),
    }

    assert_eq!(store.view_stats_for_user(1).await.unwrap().len(), 1);
    assert_eq!(state.manager.current(1).await.unwrap().session.videos_watched, 1);
}

#[test_log::test(tokio::test)]
async fn repeating_the_final_completion_finds_no_session() {
    let store = Arc::new(MemoryStore::new());
    let source = ScriptedSource::new().with("UC1", QueueResolution::Items(items("a", 1)));
    let state = app_state(store.clone(), Arc::new(source));

    state.manager.start(1, "UC1").await.unwrap();
    state.manager.report_completion(1, None, "a-0", 40).await.unwrap();

    assert!(matches!(
        state.manager.report_completion(1, None, "a-0", 40).await,
        Err(BoostError::NoActiveSession(1))
    ));
    assert_eq!(store.view_stats_for_user(1).await.unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn failing_primary_resolution_falls_back_to_search() {
    let store = Arc::new(MemoryStore::new());
    let platform = SearchOnlyPlatform {
        search: stubs("s", 5),
    };
    let source = FallbackVideoSource::new(platform, ResolverSettings::default());
    let state = app_state(store, Arc::new(source));

    let snapshot = started(state.manager.start(2, "UCfallback").await.unwrap());
    assert_eq!(snapshot.queue.len(), 5);
    assert_eq!(snapshot.queue[0].video_id, "s-0");
    assert_eq!(snapshot.queue[0].duration, 120);
    assert!(snapshot.queue[1..].iter().all(|item| item.duration == 300));
}

#[test_log::test(tokio::test)]
async fn empty_resolution_creates_no_session() {
    let store = Arc::new(MemoryStore::new());
    let state = app_state(store.clone(), Arc::new(ScriptedSource::new()));

    let outcome = state.manager.start(3, "UCempty").await.unwrap();
    assert_eq!(
        outcome,
        StartOutcome::NothingToPlay {
            channel_id: "UCempty".into(),
            feed_url: Some("https://feeds.test/UCempty".into()),
        }
    );
    assert!(store.get_session(3).await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn stopping_without_a_session_is_a_no_op() {
    let store = Arc::new(MemoryStore::new());
    let state = app_state(store, Arc::new(ScriptedSource::new()));
    let mut events = state.bus.subscribe();

    assert!(!state.manager.stop(4).await.unwrap());
    assert!(events.try_recv().is_err());
}

#[test_log::test(tokio::test)]
async fn concurrent_users_do_not_interfere() {
    let store = Arc::new(MemoryStore::new());
    let source = ScriptedSource::new()
        .with("UCa", QueueResolution::Items(items("a", 2)))
        .with("UCb", QueueResolution::Items(items("b", 4)));
    let state = app_state(store, Arc::new(source));

    let (first, second) = tokio::join!(
        state.manager.start(10, "UCa"),
        state.manager.start(11, "UCb")
    );
    let first = started(first.unwrap());
    let second = started(second.unwrap());

    assert_eq!(first.session.channel_id, "UCa");
    assert_eq!(first.queue.len(), 2);
    assert_eq!(second.session.channel_id, "UCb");
    assert_eq!(second.queue.len(), 4);

    state.manager.report_completion(10, None, "a-0", 30).await.unwrap();
    assert_eq!(state.manager.current(11).await.unwrap().session.videos_watched, 0);
}

#[test_log::test(tokio::test)]
async fn restarting_replaces_the_previous_session_entirely() {
    let store = Arc::new(MemoryStore::new());
    let source = ScriptedSource::new()
        .with("UC1", QueueResolution::Items(items("a", 3)))
        .with("UC2", QueueResolution::Items(items("b", 2)));
    let state = app_state(store.clone(), Arc::new(source));
    let mut events = state.bus.subscribe();

    state.manager.start(5, "UC1").await.unwrap();
    state.manager.report_completion(5, None, "a-0", 40).await.unwrap();

    let snapshot = started(state.manager.start(5, "UC2").await.unwrap());
    assert_eq!(snapshot.session.videos_watched, 0);
    assert!(snapshot.queue.iter().all(|item| item.video_id.starts_with("b-")));

    let queue = store.get_queue(5).await.unwrap();
    assert_eq!(queue.len(), 2);
    assert!(queue.iter().all(|entry| entry.video_id.starts_with("b-")));

    // earlier views stay recorded
    assert_eq!(store.view_stats_for_user(5).await.unwrap().len(), 1);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event_type(&event));
    }
    assert_eq!(seen, vec!["started", "viewCounted", "stopped", "started"]);
}

#[test_log::test(tokio::test)]
async fn stop_during_resolution_discards_the_result() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::new(items("g", 2)));
    let state = app_state(store.clone(), source.clone());

    let manager = state.manager.clone();
    let pending = tokio::spawn(async move { manager.start(6, "UC1").await });

    source.entered.notified().await;
    assert!(!state.manager.stop(6).await.unwrap());
    source.release.notify_one();

    let outcome = pending.await.unwrap().unwrap();
    assert_eq!(outcome, StartOutcome::Superseded);
    assert!(store.get_session(6).await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn failed_view_write_leaves_session_untouched() {
    let store = Arc::new(FlakyStore::default());
    let source = ScriptedSource::new().with("UC1", QueueResolution::Items(items("a", 2)));
    let state = app_state(store.clone(), Arc::new(source));

    state.manager.start(8, "UC1").await.unwrap();

    store.fail_views(true);
    let err = state
        .manager
        .report_completion(8, None, "a-0", 40)
        .await
        .unwrap_err();
    assert!(matches!(err, BoostError::Storage(_)));
    assert!(err.is_retryable());

    let snapshot = state.manager.current(8).await.unwrap();
    assert_eq!(snapshot.session.videos_watched, 0);
    assert_eq!(snapshot.session.active_video_id.as_deref(), Some("a-0"));

    // the last item restores the deleted session on failure
    store.fail_views(false);
    state.manager.report_completion(8, None, "a-0", 40).await.unwrap();
    store.fail_views(true);
    assert!(state.manager.report_completion(8, None, "a-1", 40).await.is_err());

    let snapshot = state.manager.current(8).await.unwrap();
    assert_eq!(snapshot.session.videos_watched, 1);
    assert_eq!(snapshot.queue.len(), 2);
    assert_eq!(snapshot.queue[1].status, ItemStatus::Playing);

    store.fail_views(false);
    assert!(matches!(
        state.manager.report_completion(8, None, "a-1", 40).await.unwrap(),
        CompletionOutcome::Finished { videos_watched: 2, .. }
    ));
    assert_eq!(store.view_stats_for_user(8).await.unwrap().len(), 2);
}

#[test_log::test(tokio::test)]
async fn user_without_views_has_empty_breakdown() {
    let store = Arc::new(MemoryStore::new());
    let state = app_state(store, Arc::new(ScriptedSource::new()));

    let stats = state.aggregator.compute_user_stats(99).await.unwrap();
    assert_eq!(stats.total_views, 0);
    assert!(stats.views_by_channel.is_empty());
    assert!(state.aggregator.compute_geo_metrics(99).await.unwrap().is_empty());
}
