// Setup Options - partial set of configuration values for ConfigStore::setup

use super::LogLevel;
use crate::domain::queue::{normalize_queue_name, QueueName};
use crate::port::LogSink;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Options merged by `ConfigStore::setup`
///
/// Every field is optional; `None` leaves the current value untouched.
#[derive(Clone, Default)]
pub struct SetupOptions {
    pub queue: Option<QueueName>,
    pub min_workers: Option<i64>,
    pub max_workers: Option<i64>,
    pub wait_time: Option<u64>,
    pub env: Option<bool>,
    pub vars: Option<String>,
    pub task_runner_path: Option<String>,
    pub run_path: Option<String>,
    pub command_override: Option<String>,
    pub worker_task: Option<String>,
    pub logger: Option<Arc<dyn LogSink>>,
    pub log_level: Option<LogLevel>,
}

impl SetupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(mut self, queue: impl Into<QueueName>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    pub fn min_workers(mut self, min_workers: i64) -> Self {
        self.min_workers = Some(min_workers);
        self
    }

    pub fn max_workers(mut self, max_workers: i64) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    pub fn wait_time(mut self, secs: u64) -> Self {
        self.wait_time = Some(secs);
        self
    }

    pub fn env(mut self, env: bool) -> Self {
        self.env = Some(env);
        self
    }

    pub fn vars(mut self, vars: impl Into<String>) -> Self {
        self.vars = Some(vars.into());
        self
    }

    pub fn task_runner_path(mut self, path: impl Into<String>) -> Self {
        self.task_runner_path = Some(path.into());
        self
    }

    pub fn run_path(mut self, path: impl Into<String>) -> Self {
        self.run_path = Some(path.into());
        self
    }

    pub fn command_override(mut self, command: impl Into<String>) -> Self {
        self.command_override = Some(command.into());
        self
    }

    pub fn worker_task(mut self, task: impl Into<String>) -> Self {
        self.worker_task = Some(task.into());
        self
    }

    pub fn logger(mut self, logger: Arc<dyn LogSink>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Build options from string-keyed values (config files, env, JSON)
    ///
    /// Unrecognized keys and values of the wrong type are dropped.
    /// `rake_path` is accepted for `task_runner_path`.
    pub fn from_map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut options = Self::default();

        for (key, value) in entries {
            let key = key.as_ref();
            let applied = match key {
                "queue" => as_string(&value)
                    .and_then(|q| normalize_queue_name(&q))
                    .map(|q| options.queue = Some(q)),
                "min_workers" => as_int(&value).map(|v| options.min_workers = Some(v)),
                "max_workers" => as_int(&value).map(|v| options.max_workers = Some(v)),
                "wait_time" => as_int(&value)
                    .and_then(|v| u64::try_from(v).ok())
                    .map(|v| options.wait_time = Some(v)),
                "env" => as_bool(&value).map(|v| options.env = Some(v)),
                "vars" => as_string(&value).map(|v| options.vars = Some(v)),
                "task_runner_path" | "rake_path" => {
                    as_string(&value).map(|v| options.task_runner_path = Some(v))
                }
                "run_path" => as_string(&value).map(|v| options.run_path = Some(v)),
                "command_override" => as_string(&value).map(|v| options.command_override = Some(v)),
                "worker_task" => as_string(&value).map(|v| options.worker_task = Some(v)),
                "log_level" => as_string(&value)
                    .and_then(|v| v.parse().ok())
                    .map(|v| options.log_level = Some(v)),
                _ => {
                    debug!(option = %key, "Ignoring unrecognized director option");
                    continue;
                }
            };

            if applied.is_none() {
                debug!(option = %key, value = %value, "Ignoring director option with invalid value");
            }
        }

        options
    }

    /// Same as `from_map` for a JSON object; any other value yields no options
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Self::default(),
        }
    }
}

impl fmt::Debug for SetupOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupOptions")
            .field("queue", &self.queue)
            .field("min_workers", &self.min_workers)
            .field("max_workers", &self.max_workers)
            .field("wait_time", &self.wait_time)
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

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
