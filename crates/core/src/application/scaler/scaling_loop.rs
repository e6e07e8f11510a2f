// Scaling Loop - periodic driver for Scaler::maintain
// Host-side scheduler: errors are logged and the loop keeps ticking

use super::constants::DEFAULT_POLL_INTERVAL;
use super::{Scaler, ShutdownToken};
use crate::domain::ScaleDecision;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Calls the scaler on a fixed cadence until shutdown
pub struct ScalingLoop {
    scaler: Arc<Scaler>,
    poll_interval: Duration,
}

impl ScalingLoop {
    pub fn new(scaler: Arc<Scaler>) -> Self {
        Self::with_interval(scaler, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(scaler: Arc<Scaler>, poll_interval: Duration) -> Self {
        Self {
            scaler,
            poll_interval,
        }
    }

    /// Run one gated scaling cycle
    ///
    /// `Ok(None)` when the debounce window skipped it.
    pub async fn run_once(&self) -> Result<Option<ScaleDecision>> {
        let outcome = self.scaler.maintain().await?;

        match outcome {
            Some(ScaleDecision::NoChange) => debug!("Scaling cycle: fleet within bounds"),
            Some(decision) => info!(decision = ?decision, "Scaling cycle applied"),
            None => debug!("Scaling cycle skipped"),
        }

        Ok(outcome)
    }

    /// Run the loop until `shutdown` fires
    ///
    /// Should be spawned in tokio::spawn
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            queue = ?self.scaler.config().queue(),
            "Scaling loop started"
        );

        let mut tick = interval(self.poll_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if shutdown.is_shutdown() {
                break;
            }

            tokio::select! {
                _ = tick.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(error = %e, "Scaling cycle failed");
                    }
                }
                _ = shutdown.wait() => {
                    info!("Scaling loop interrupted");
                    break;
                }
            }
        }

        info!("Scaling loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::scaler::shutdown_channel;
    use crate::config::{ConfigStore, SetupOptions};
    use crate::domain::Worker;
    use crate::port::process_launcher::mocks::MockProcessLauncher;
    use crate::port::time_provider::mocks::MockTimeProvider;
    use crate::port::worker_registry::mocks::MockWorkerRegistry;

    fn build(
        registry: Arc<MockWorkerRegistry>,
        launcher: Arc<MockProcessLauncher>,
        clock: Arc<MockTimeProvider>,
    ) -> Arc<Scaler> {
        let config = Arc::new(ConfigStore::with_options(SetupOptions::new().queue("test")));
        Arc::new(Scaler::new(config, registry, launcher, clock))
    }

    #[tokio::test]
    async fn test_run_once_applies_and_debounces() {
        let registry = Arc::new(MockWorkerRegistry::empty());
        let launcher = Arc::new(MockProcessLauncher::new());
        let clock = Arc::new(MockTimeProvider::new(0));
        let scaling_loop = ScalingLoop::new(build(registry, launcher.clone(), clock.clone()));

        assert_eq!(
            scaling_loop.run_once().await.unwrap(),
            Some(ScaleDecision::ScaleUp(1))
        );
        assert_eq!(scaling_loop.run_once().await.unwrap(), None);

        clock.advance_secs(60);
        assert_eq!(
            scaling_loop.run_once().await.unwrap(),
            Some(ScaleDecision::ScaleUp(1))
        );
        assert_eq!(launcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_run_once_surfaces_errors() {
        let registry = Arc::new(MockWorkerRegistry::empty());
        registry.fail_with("down");
        let scaling_loop = ScalingLoop::new(build(
            registry,
            Arc::new(MockProcessLauncher::new()),
            Arc::new(MockTimeProvider::new(0)),
        ));

        assert!(scaling_loop.run_once().await.is_err());
    }

    #[tokio::test]
    async fn test_run_survives_errors_and_stops_on_shutdown() {
        let registry = Arc::new(MockWorkerRegistry::new(vec![Worker::new(
            "host:1:test",
            ["test"],
        )]));
        registry.fail_with("down");
        let scaler = build(
            registry.clone(),
            Arc::new(MockProcessLauncher::new()),
            Arc::new(MockTimeProvider::new(0)),
        );
        scaler.config().setup(SetupOptions::new().wait_time(0));

        let (tx, token) = shutdown_channel();
        let handle = tokio::spawn(
            ScalingLoop::with_interval(scaler, Duration::from_millis(10)).run(token),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.shutdown();
        handle.await.unwrap();

        assert!(registry.list_calls() >= 2);
    }

    #[tokio::test]
    async fn test_run_returns_when_already_shut_down() {
        let (tx, token) = shutdown_channel();
        tx.shutdown();

        let scaling_loop = ScalingLoop::new(build(
            Arc::new(MockWorkerRegistry::empty()),
            Arc::new(MockProcessLauncher::new()),
            Arc::new(MockTimeProvider::new(0)),
        ));
        scaling_loop.run(token).await;
    }
}
