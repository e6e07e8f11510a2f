//! Scaler - keeps the number of workers on one queue within bounds
//!
//! The scaling loop (or any host scheduler) calls [`Scaler::maintain`]
//! repeatedly. Each call is gated by the debounce window; when a cycle
//! runs, the scaler counts the workers dedicated to the queue and starts
//! or stops the difference.

pub mod constants;
mod scaling_loop;
mod shutdown;

pub use scaling_loop::ScalingLoop;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::config::ConfigStore;
use crate::domain::worker::dedicated_to;
use crate::domain::{LaunchCommand, QueueName, ScaleDecision, Worker};
use crate::error::{DirectorError, Result};
use crate::port::{LaunchError, ProcessLauncher, TimeProvider, WorkerRegistry};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Scaling engine for a single queue
pub struct Scaler {
    config: Arc<ConfigStore>,
    registry: Arc<dyn WorkerRegistry>,
    launcher: Arc<dyn ProcessLauncher>,
    time_provider: Arc<dyn TimeProvider>,
}

impl Scaler {
    pub fn new(
        config: Arc<ConfigStore>,
        registry: Arc<dyn WorkerRegistry>,
        launcher: Arc<dyn ProcessLauncher>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            config,
            registry,
            launcher,
            time_provider,
        }
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    /// Start `count` workers on the configured queue
    ///
    /// Every launch uses the same command, built from one configuration
    /// snapshot. A failed launch does not stop the remaining ones; the first
    /// failure is returned once all `count` attempts were made.
    ///
    /// Returns the number of successful launches.
    pub async fn scale_up(&self, count: usize) -> Result<usize> {
        if count == 0 {
            return Ok(0);
        }

        let config = self.config.snapshot();
        let queue = config.queue.clone().ok_or(DirectorError::QueueNotConfigured)?;
        let command = LaunchCommand::from_config(&config, &queue);

        let mut launched = 0;
        let mut first_error: Option<LaunchError> = None;

        for attempt in 1..=count {
            self.config.log(&format!("starting worker on queue {}", queue));

            match self.launcher.launch(&command).await {
                Ok(()) => launched += 1,
                Err(e) => {
                    warn!(
                        queue = %queue,
                        attempt = attempt,
                        count = count,
                        error = %e,
                        "Worker launch failed"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        info!(
            queue = %queue,
            requested = count,
            launched = launched,
            "Scale up finished"
        );

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(launched),
        }
    }

    /// Stop up to `count` workers dedicated to the configured queue
    ///
    /// Having fewer eligible workers than `count` is not an error.
    /// Returns the number of workers deregistered.
    pub async fn scale_down(&self, count: usize) -> Result<usize> {
        if count == 0 {
            return Ok(0);
        }

        let queue = self.require_queue()?;
        let workers = self.registry.list_workers().await?;
        let targets: Vec<&Worker> = dedicated_to(&workers, &queue).take(count).collect();

        for worker in &targets {
            self.config
                .log(&format!("stopping worker {} on queue {}", worker.id, queue));
            self.registry.deregister(&worker.id).await?;
        }

        info!(
            queue = %queue,
            requested = count,
            stopped = targets.len(),
            "Scale down finished"
        );

        Ok(targets.len())
    }

    /// Run `action` unless the last cycle is more recent than `wait_time`
    ///
    /// Returns `None` without side effects while the window is open.
    /// Otherwise `last_scaled` is set to now and `action` runs exactly once.
    pub async fn scaling<F, Fut, T>(&self, action: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let now = self.time_provider.now_millis();
        if !self.config.begin_cycle(now) {
            debug!(now = now, "Scaling skipped: wait time not elapsed");
            return None;
        }

        Some(action().await)
    }

    /// Compare the dedicated fleet against the bounds and correct it
    ///
    /// Meant to be called through [`Scaler::scaling`]; see [`Scaler::maintain`].
    pub async fn scale_within_requirements(&self) -> Result<ScaleDecision> {
        let config = self.config.snapshot();
        let queue = config.queue.as_deref().ok_or(DirectorError::QueueNotConfigured)?;

        let workers = self.registry.list_workers().await?;
        let running = dedicated_to(&workers, queue).count();
        let decision = ScaleDecision::for_fleet(running, config.min_workers, config.max_workers);

        debug!(
            queue = %queue,
            running = running,
            min_workers = config.min_workers,
            max_workers = config.max_workers,
            decision = ?decision,
            "Evaluated worker fleet"
        );

        match decision {
            ScaleDecision::ScaleUp(count) => {
                self.scale_up(count).await?;
            }
            ScaleDecision::ScaleDown(count) => {
                self.scale_down(count).await?;
            }
            ScaleDecision::NoChange => {}
        }

        Ok(decision)
    }

    /// Gated scaling cycle: the entry point for the host scheduler
    ///
    /// `Ok(None)` means the debounce window skipped this call.
    pub async fn maintain(&self) -> Result<Option<ScaleDecision>> {
        self.scaling(|| self.scale_within_requirements())
            .await
            .transpose()
    }

    fn require_queue(&self) -> Result<QueueName> {
        self.config.queue().ok_or(DirectorError::QueueNotConfigured)
    }
}
