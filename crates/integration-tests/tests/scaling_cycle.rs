//! End-to-end scaling cycles against in-memory collaborators

use director_core::application::Scaler;
use director_core::domain::{ScaleDecision, Worker};
use director_core::port::process_launcher::mocks::MockProcessLauncher;
use director_core::port::time_provider::mocks::MockTimeProvider;
use director_core::port::worker_registry::mocks::MockWorkerRegistry;
use director_core::{ConfigStore, DirectorError, SetupOptions};
use std::sync::Arc;

struct Fleet {
    config: Arc<ConfigStore>,
    registry: Arc<MockWorkerRegistry>,
    launcher: Arc<MockProcessLauncher>,
    clock: Arc<MockTimeProvider>,
    scaler: Scaler,
}

fn fleet(workers: Vec<Worker>, options: SetupOptions) -> Fleet {
    let config = Arc::new(ConfigStore::with_options(SetupOptions::new().queue("test")));
    config.setup(options);

    let registry = Arc::new(MockWorkerRegistry::new(workers));
    let launcher = Arc::new(MockProcessLauncher::new());
    let clock = Arc::new(MockTimeProvider::new(1_700_000_000_000));
    let scaler = Scaler::new(
        config.clone(),
        registry.clone(),
        launcher.clone(),
        clock.clone(),
    );

    Fleet {
        config,
        registry,
        launcher,
        clock,
        scaler,
    }
}

fn on_test(pid: u32) -> Worker {
    Worker::new(format!("worker-host:{}:test", pid), ["test"])
}

#[tokio::test]
async fn test_empty_queue_gets_one_worker() {
    let f = fleet(vec![], SetupOptions::new());

    let decision = f.scaler.maintain().await.unwrap();

    assert_eq!(decision, Some(ScaleDecision::ScaleUp(1)));
    assert_eq!(f.launcher.commands(), vec![" QUEUE=test rake  resque:work &"]);
}

#[tokio::test]
async fn test_negative_minimum_never_requests_zero_or_less() {
    let f = fleet(vec![], SetupOptions::new().min_workers(-10));

    let decision = f.scaler.maintain().await.unwrap();

    assert_eq!(decision, Some(ScaleDecision::ScaleUp(1)));
    assert_eq!(f.launcher.call_count(), 1);
}

#[tokio::test]
async fn test_over_maximum_stops_extra_workers() {
    let f = fleet(vec![on_test(1), on_test(2)], SetupOptions::new().max_workers(1));

    let decision = f.scaler.maintain().await.unwrap();

    assert_eq!(decision, Some(ScaleDecision::ScaleDown(1)));
    assert_eq!(f.registry.workers().len(), 1);
    assert_eq!(f.launcher.call_count(), 0);
}

#[tokio::test]
async fn test_shared_worker_does_not_count() {
    let f = fleet(
        vec![Worker::new("worker-host:7:test,other", ["test", "other"])],
        SetupOptions::new(),
    );

    let decision = f.scaler.maintain().await.unwrap();

    assert_eq!(decision, Some(ScaleDecision::ScaleUp(1)));
    // The shared worker is left running
    assert!(f.registry.deregistered().is_empty());
}

#[tokio::test]
async fn test_fleet_converges_over_cycles() {
    let f = fleet(
        vec![],
        SetupOptions::new().min_workers(3).max_workers(4).wait_time(30),
    );

    // Cycle 1: three workers requested
    assert_eq!(
        f.scaler.maintain().await.unwrap(),
        Some(ScaleDecision::ScaleUp(3))
    );

    // Inside the window: nothing happens even though the registry is still empty
    f.clock.advance_secs(10);
    assert_eq!(f.scaler.maintain().await.unwrap(), None);
    assert_eq!(f.launcher.call_count(), 3);

    // The launched workers registered themselves, plus three strays
    for pid in 1..=6 {
        f.registry.register(on_test(pid));
    }

    f.clock.advance_secs(20);
    assert_eq!(
        f.scaler.maintain().await.unwrap(),
        Some(ScaleDecision::ScaleDown(2))
    );
    assert_eq!(f.registry.workers().len(), 4);

    f.clock.advance_secs(30);
    assert_eq!(
        f.scaler.maintain().await.unwrap(),
        Some(ScaleDecision::NoChange)
    );
}

#[tokio::test]
async fn test_reconfigure_between_cycles() {
    let f = fleet(vec![on_test(1)], SetupOptions::new().wait_time(0));

    assert_eq!(
        f.scaler.maintain().await.unwrap(),
        Some(ScaleDecision::NoChange)
    );

    f.config.setup(SetupOptions::new().min_workers(2).command_override("bin/worker test"));
    assert_eq!(
        f.scaler.maintain().await.unwrap(),
        Some(ScaleDecision::ScaleUp(1))
    );
    assert_eq!(f.launcher.commands(), vec!["bin/worker test"]);
}

#[tokio::test]
async fn test_reset_clears_queue_and_debounce() {
    let f = fleet(vec![], SetupOptions::new());
    f.scaler.maintain().await.unwrap();

    f.config.reset();

    // Debounce window was discarded, so the cycle runs and hits the missing queue
    let result = f.scaler.maintain().await;
    assert!(matches!(result, Err(DirectorError::QueueNotConfigured)));

    f.config.setup(SetupOptions::new().queue("test"));
    f.clock.advance_secs(60);
    assert_eq!(
        f.scaler.maintain().await.unwrap(),
        Some(ScaleDecision::ScaleUp(1))
    );
}
