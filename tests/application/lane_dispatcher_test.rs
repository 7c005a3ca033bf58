use std::collections::HashMap;
use std::sync::Arc;

use stt_lanes::application::ports::TranscriptionError;
use stt_lanes::application::services::{AdmissionPermit, LaneDispatcher};
use stt_lanes::domain::Lane;
use stt_lanes::infrastructure::audio::{EngineGate, MockHotEngine};
use stt_lanes::presentation::{Environment, Settings};

use crate::helpers::{
    entries, fake_worker, fast_lane, request, scripted_slow_lane, slow_lane_with, staging_dir,
    wait_until,
};

#[tokio::test]
async fn given_idle_fast_lane_when_dispatching_then_hot_engine_serves_request() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = Arc::new(MockHotEngine::returning("hello"));
    let dispatcher = LaneDispatcher::new(
        Some(fast_lane(Arc::clone(&engine), dir.path())),
        scripted_slow_lane(dir.path(), "ok"),
    );

    let outcome = dispatcher.dispatch(&request()).await.unwrap();

    assert_eq!(outcome.lane, Lane::Fast);
    assert_eq!(outcome.result.text(), "hello");
    assert_eq!(engine.calls(), 1);
    assert!(!dispatcher.permit().is_held());
    assert!(entries(&staging_dir(dir.path())).is_empty());
}

#[tokio::test]
async fn given_busy_fast_lane_when_dispatching_then_cold_worker_serves_request() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = Arc::new(MockHotEngine::returning("hello"));
    let permit = AdmissionPermit::new();
    let dispatcher = LaneDispatcher::new(
        Some(fast_lane(Arc::clone(&engine), dir.path())),
        scripted_slow_lane(dir.path(), "ok"),
    )
    .with_permit(permit.clone());
    let _held = permit.try_acquire().unwrap();

    let outcome = dispatcher.dispatch(&request()).await.unwrap();

    assert_eq!(outcome.lane, Lane::Slow);
    assert_eq!(outcome.result.text(), "cold transcript");
    assert_eq!(engine.calls(), 0);
    assert!(permit.is_held());
    assert!(entries(&staging_dir(dir.path())).is_empty());
}

#[tokio::test]
async fn given_no_hot_engine_when_dispatching_then_fails_without_touching_either_lane() {
    let dir = tempfile::TempDir::new().unwrap();
    let args_log = dir.path().join("args.log");
    let worker = fake_worker(dir.path(), "ok").with_env("FAKE_WHISPER_ARGS_LOG", &args_log);
    let dispatcher = LaneDispatcher::new(None, slow_lane_with(dir.path(), worker));

    let result = dispatcher.dispatch(&request()).await;

    assert!(matches!(result, Err(TranscriptionError::EngineUnavailable)));
    assert_eq!(result.unwrap_err().to_string(), "Model not loaded.");
    assert!(!args_log.exists());
    assert!(!dispatcher.permit().is_held());
    assert!(!dispatcher.engine_loaded());
}

#[tokio::test]
async fn given_busy_fast_lane_and_failing_worker_when_dispatching_then_surfaces_worker_stderr() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = Arc::new(MockHotEngine::returning("hello"));
    let permit = AdmissionPermit::new();
    let dispatcher = LaneDispatcher::new(
        Some(fast_lane(Arc::clone(&engine), dir.path())),
        scripted_slow_lane(dir.path(), "fail"),
    )
    .with_permit(permit.clone());
    let _held = permit.try_acquire().unwrap();

    let result = dispatcher.dispatch(&request()).await;

    match result {
        Err(TranscriptionError::TranscriptionFailed { lane, message }) => {
            assert_eq!(lane, Lane::Slow);
            assert!(message.contains("CUDA out of memory"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(entries(&staging_dir(dir.path())).is_empty());
}

#[tokio::test]
async fn given_failing_hot_engine_when_dispatching_then_does_not_retry_on_slow_lane() {
    let dir = tempfile::TempDir::new().unwrap();
    let args_log = dir.path().join("args.log");
    let engine = Arc::new(MockHotEngine::failing("boom"));
    let worker = fake_worker(dir.path(), "ok").with_env("FAKE_WHISPER_ARGS_LOG", &args_log);
    let dispatcher = LaneDispatcher::new(
        Some(fast_lane(Arc::clone(&engine), dir.path())),
        slow_lane_with(dir.path(), worker),
    );

    let result = dispatcher.dispatch(&request()).await;

    assert!(matches!(
        result,
        Err(TranscriptionError::TranscriptionFailed { lane: Lane::Fast, .. })
    ));
    assert!(!args_log.exists());
    assert!(!dispatcher.permit().is_held());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_requests_when_dispatching_then_exactly_one_uses_hot_engine() {
    let dir = tempfile::TempDir::new().unwrap();
    let gate = EngineGate::new();
    let engine = Arc::new(MockHotEngine::returning("hello").with_gate(gate.clone()));
    let dispatcher = Arc::new(LaneDispatcher::new(
        Some(fast_lane(Arc::clone(&engine), dir.path())),
        scripted_slow_lane(dir.path(), "ok"),
    ));

    let first = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move { dispatcher.dispatch(&request()).await })
    };
    wait_until(|| engine.in_flight() == 1).await;

    let others: Vec<_> = (0..4)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.dispatch(&request()).await })
        })
        .collect();

    let mut lanes = Vec::new();
    for handle in others {
        lanes.push(handle.await.unwrap().unwrap().lane);
    }
    assert!(dispatcher.permit().is_held());

    gate.open();
    lanes.push(first.await.unwrap().unwrap().lane);

    assert_eq!(lanes.iter().filter(|l| **l == Lane::Fast).count(), 1);
    assert_eq!(lanes.iter().filter(|l| **l == Lane::Slow).count(), 4);
    assert_eq!(engine.calls(), 1);
    assert_eq!(engine.peak_in_flight(), 1);
    assert!(!dispatcher.permit().is_held());
    assert!(entries(&staging_dir(dir.path())).is_empty());
}

#[tokio::test]
async fn given_released_permit_when_dispatching_again_then_fast_lane_is_reused() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = Arc::new(MockHotEngine::returning("hello"));
    let dispatcher = LaneDispatcher::new(
        Some(fast_lane(Arc::clone(&engine), dir.path())),
        scripted_slow_lane(dir.path(), "ok"),
    );

    for _ in 0..3 {
        let outcome = dispatcher.dispatch(&request()).await.unwrap();
        assert_eq!(outcome.lane, Lane::Fast);
    }
    assert_eq!(engine.calls(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_default_settings_and_busy_fast_lane_when_many_requests_arrive_then_all_run_on_slow_lane()
 {
    let dir = tempfile::TempDir::new().unwrap();
    let settings = Settings::from_env_map(Environment::Test, HashMap::new()).unwrap();
    let permit = AdmissionPermit::new();
    let dispatcher = Arc::new(
        LaneDispatcher::new(
            Some(fast_lane(Arc::new(MockHotEngine::returning("hot")), dir.path())),
            scripted_slow_lane(dir.path(), "linger")
                .with_max_workers(settings.lanes.max_cold_workers),
        )
        .with_permit(permit.clone()),
    );
    let _held = permit.try_acquire().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.dispatch(&request()).await })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.lane, Lane::Slow);
        assert_eq!(outcome.result.text(), "cold transcript");
    }
    assert!(entries(&staging_dir(dir.path())).is_empty());
}
