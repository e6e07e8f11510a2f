//! Daemon settings
//!
//! Layered with the `config` crate: defaults, then an optional TOML/YAML/JSON
//! file, then `DIRECTOR__*` environment variables
//! (e.g. `DIRECTOR__REDIS_URL`, `DIRECTOR__DIRECTOR__MIN_WORKERS`).
//!
//! ```text
//! redis_url = "redis://127.0.0.1:6379"
//! namespace = "resque"
//! poll_interval_secs = 5
//!
//! [director]
//! queue = "mailers"
//! min_workers = 2
//! max_workers = 8
//! rake_path = "bin/rake"
//! run_path = "/srv/app/current"
//! env = true
//! ```

use anyhow::{Context, Result};
use director_core::application::scaler::constants::DEFAULT_POLL_INTERVAL;
use director_core::{LogLevel, SetupOptions};
use director_infra_redis::DEFAULT_NAMESPACE;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_LOG_FORMAT: &str = "pretty";
const ENV_PREFIX: &str = "DIRECTOR";
/// Level of `DIRECTORS LOG:` lines unless `[director] log_level` is set;
/// matches the default `director=info` filter so the lines are visible
const DEFAULT_DIRECTOR_LOG_LEVEL: LogLevel = LogLevel::Info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    pub redis_url: String,
    /// Resque key namespace
    pub namespace: String,
    pub poll_interval_secs: u64,
    /// `pretty` or `json`
    pub log_format: String,
    /// Route `DIRECTORS LOG:` lines to tracing
    pub director_log: bool,
    /// Options for the director's configuration store
    pub director: HashMap<String, serde_json::Value>,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            log_format: DEFAULT_LOG_FORMAT.to_string(),
            director_log: true,
            director: HashMap::new(),
        }
    }
}

impl DaemonSettings {
    /// Options for `ConfigStore::setup`; unknown keys are dropped there
    pub fn director_options(&self) -> SetupOptions {
        let mut options = SetupOptions::from_map(self.director.clone());
        options.log_level.get_or_insert(DEFAULT_DIRECTOR_LOG_LEVEL);
        options
    }

    /// Poll interval, never zero
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Load settings, reading `path` when given (`~` is expanded)
pub fn load(path: Option<&str>) -> Result<DaemonSettings> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        let expanded = PathBuf::from(shellexpand::tilde(path).into_owned());
        builder = builder.add_source(config::File::from(expanded.clone()).required(true));
        tracing::debug!(path = %expanded.display(), "Reading settings file");
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .context("Failed to read settings")?
        .try_deserialize()
        .context("Invalid settings")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("director-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = DaemonSettings::default();

        assert_eq!(settings.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(settings.namespace, "resque");
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
        assert!(settings.director_log);
        assert!(settings.director.is_empty());
        assert_eq!(settings.director_options().log_level, Some(LogLevel::Info));
    }

    #[test]
    fn test_director_log_level_from_settings_wins() {
        let mut settings = DaemonSettings::default();
        settings
            .director
            .insert("log_level".to_string(), serde_json::json!("warn"));

        assert_eq!(settings.director_options().log_level, Some(LogLevel::Warn));
    }

    #[test]
    fn test_load_file() {
        let path = write_temp(
            r#"
redis_url = "redis://redis.internal:6380"
poll_interval_secs = 0

[director]
queue = "mailers"
min_workers = 2
max_workers = 8
rake_path = "bin/rake"
env = true
bogus = "ignored"
"#,
        );

        let settings = load(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.redis_url, "redis://redis.internal:6380");
        assert_eq!(settings.namespace, "resque");
        assert_eq!(settings.poll_interval(), Duration::from_secs(1));

        let options = settings.director_options();
        assert_eq!(options.queue.as_deref(), Some("mailers"));
        assert_eq!(options.min_workers, Some(2));
        assert_eq!(options.max_workers, Some(8));
        assert_eq!(options.task_runner_path.as_deref(), Some("bin/rake"));
        assert_eq!(options.env, Some(true));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load(Some("/definitely/not/here.toml")).is_err());
    }
}
