//! Configuration Store
//!
//! Settings governing one director instance: scaling thresholds, debounce
//! timing, launch command shape and the log sink. The store is an explicit
//! object shared by reference (usually `Arc<ConfigStore>`); `reset` rebuilds
//! it from defaults.
//!
//! Bad input never fails: unknown options are dropped and an inverted
//! `max_workers` falls back to unbounded.

mod log_level;
mod options;

pub use log_level::LogLevel;
pub use options::SetupOptions;

use crate::domain::QueueName;
use crate::port::LogSink;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Prefix of every line sent to the configured logger
pub const LOG_TAG: &str = "DIRECTORS LOG: ";

pub const DEFAULT_MIN_WORKERS: i64 = 1;
/// Zero means no ceiling
pub const DEFAULT_MAX_WORKERS: i64 = 0;
pub const DEFAULT_WAIT_TIME_SECS: u64 = 60;
pub const DEFAULT_TASK_RUNNER: &str = "rake";
pub const DEFAULT_WORKER_TASK: &str = "resque:work";

/// Director configuration record
#[derive(Clone)]
pub struct DirectorConfig {
    pub queue: Option<QueueName>,
    pub min_workers: i64,
    pub max_workers: i64,
    /// Seconds between scaling cycles
    pub wait_time: u64,
    /// Epoch millis of the last cycle that ran; not settable through `setup`
    pub last_scaled: Option<i64>,
    pub env: bool,
    pub vars: String,
    pub task_runner_path: String,
    pub run_path: String,
    pub command_override: String,
    pub worker_task: String,
    pub logger: Option<Arc<dyn LogSink>>,
    pub log_level: LogLevel,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            queue: None,
            min_workers: DEFAULT_MIN_WORKERS,
            max_workers: DEFAULT_MAX_WORKERS,
            wait_time: DEFAULT_WAIT_TIME_SECS,
            last_scaled: None,
            env: false,
            vars: String::new(),
            task_runner_path: DEFAULT_TASK_RUNNER.to_string(),
            run_path: String::new(),
            command_override: String::new(),
            worker_task: DEFAULT_WORKER_TASK.to_string(),
            logger: None,
            log_level: LogLevel::default(),
        }
    }
}

impl fmt::Debug for DirectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectorConfig")
            .field("queue", &self.queue)
            .field("min_workers", &self.min_workers)
            .field("max_workers", &self.max_workers)
            .field("wait_time", &self.wait_time)
            .field("last_scaled", &self.last_scaled)
            .field("env", &self.env)
            .field("vars", &self.vars)
            .field("task_runner_path", &self.task_runner_path)
            .field("run_path", &self.run_path)
            .field("command_override", &self.command_override)
            .field("worker_task", &self.worker_task)
            .field("logger", &self.logger.as_ref().map(|_| "LogSink"))
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl DirectorConfig {
    /// Merge `options` into this record
    ///
    /// `min_workers` and `max_workers` are assigned together before the
    /// bounds check runs.
    fn apply(&mut self, options: SetupOptions) {
        if let Some(queue) = options.queue {
            self.queue = Some(queue);
        }
        if let Some(min_workers) = options.min_workers {
            self.min_workers = min_workers;
        }
        if let Some(max_workers) = options.max_workers {
            self.max_workers = max_workers;
        }
        if self.max_workers < self.min_workers {
            self.max_workers = DEFAULT_MAX_WORKERS;
        }
        if let Some(wait_time) = options.wait_time {
            self.wait_time = wait_time;
        }
        if let Some(env) = options.env {
            self.env = env;
        }
        if let Some(vars) = options.vars {
            self.vars = vars;
        }
        if let Some(path) = options.task_runner_path {
            self.task_runner_path = path;
        }
        if let Some(path) = options.run_path {
            self.run_path = path;
        }
        if let Some(command) = options.command_override {
            self.command_override = command;
        }
        if let Some(task) = options.worker_task {
            self.worker_task = task;
        }
        if let Some(logger) = options.logger {
            self.logger = Some(logger);
        }
        if let Some(level) = options.log_level {
            self.log_level = level;
        }
    }

    fn wait_time_millis(&self) -> i64 {
        i64::try_from(self.wait_time)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000)
    }
}

/// Shared, mutable director configuration
///
/// All access goes through one mutex so the debounce check in
/// `begin_cycle` is atomic with respect to concurrent callers.
#[derive(Debug, Default)]
pub struct ConfigStore {
    inner: Mutex<DirectorConfig>,
}

impl ConfigStore {
    /// Store initialized with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Store initialized with defaults, then `options`
    pub fn with_options(options: SetupOptions) -> Self {
        let store = Self::new();
        store.setup(options);
        store
    }

    /// The default configuration record
    pub fn defaults() -> DirectorConfig {
        DirectorConfig::default()
    }

    /// Merge a partial set of options into the current configuration
    pub fn setup(&self, options: SetupOptions) {
        self.lock().apply(options);
    }

    /// Restore every field to its default, `last_scaled` included
    pub fn reset(&self) {
        *self.lock() = DirectorConfig::default();
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> DirectorConfig {
        self.lock().clone()
    }

    pub fn queue(&self) -> Option<QueueName> {
        self.lock().queue.clone()
    }

    /// Send `message` to the configured logger at the configured level
    ///
    /// No-op without a logger. The sink is called after the lock is released.
    pub fn log(&self, message: &str) {
        let (logger, level) = {
            let config = self.lock();
            (config.logger.clone(), config.log_level)
        };

        if let Some(logger) = logger {
            logger.log(level, &format!("{}{}", LOG_TAG, message));
        }
    }

    /// Claim the next scaling cycle at `now_millis`
    ///
    /// Returns `false`, changing nothing, while the debounce window since
    /// `last_scaled` is still open. Otherwise records `now_millis` as
    /// `last_scaled` and returns `true`.
    pub fn begin_cycle(&self, now_millis: i64) -> bool {
        let mut config = self.lock();

        if let Some(last) = config.last_scaled {
            if now_millis.saturating_sub(last) < config.wait_time_millis() {
                return false;
            }
        }

        config.last_scaled = Some(now_millis);
        true
    }

    fn lock(&self) -> MutexGuard<'_, DirectorConfig> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
