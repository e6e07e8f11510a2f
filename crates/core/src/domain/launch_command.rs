// Launch Command - shell command that starts one worker
// Assembled from ordered segments so the rendered string is reproducible.

use crate::config::DirectorConfig;
use std::fmt;

/// Stage token inserted when the task runner needs the app environment loaded
pub const ENVIRONMENT_STAGE: &str = "environment";

/// Shell command used to start a single worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchCommand {
    /// Built from configuration segments
    Assembled(CommandSegments),
    /// `command_override`, used verbatim
    Override(String),
}

/// Ordered segments of an assembled launch command
///
/// Rendered as `{prefix}{vars} QUEUE={queue} {runner} {stage} {task} &`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSegments {
    pub prefix: String,
    pub vars: String,
    pub queue: String,
    pub runner: String,
    pub stage: String,
    pub task: String,
}

impl LaunchCommand {
    /// Build the command for `queue` from a configuration snapshot
    pub fn from_config(config: &DirectorConfig, queue: &str) -> Self {
        if !config.command_override.is_empty() {
            return LaunchCommand::Override(config.command_override.clone());
        }

        let prefix = if config.run_path.is_empty() {
            String::new()
        } else {
            format!("cd {} && ", config.run_path)
        };

        let stage = if config.env {
            ENVIRONMENT_STAGE.to_string()
        } else {
            String::new()
        };

        LaunchCommand::Assembled(CommandSegments {
            prefix,
            vars: config.vars.clone(),
            queue: queue.to_string(),
            runner: config.task_runner_path.clone(),
            stage,
            task: config.worker_task.clone(),
        })
    }

    /// Full command line handed to the shell
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn is_override(&self) -> bool {
        matches!(self, LaunchCommand::Override(_))
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchCommand::Override(command) => f.write_str(command),
            LaunchCommand::Assembled(s) => write!(
                f,
                "{}{} QUEUE={} {} {} {} &",
                s.prefix, s.vars, s.queue, s.runner, s.stage, s.task
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DirectorConfig {
        DirectorConfig::default()
    }

    #[test]
    fn test_default_command() {
        let command = LaunchCommand::from_config(&config(), "test");
        assert_eq!(command.render(), " QUEUE=test rake  resque:work &");
        assert!(!command.is_override());
    }

    #[test]
    fn test_command_with_environment_stage() {
        let mut cfg = config();
        cfg.env = true;

        let command = LaunchCommand::from_config(&cfg, "test");
        assert_eq!(command.render(), " QUEUE=test rake environment resque:work &");
    }

    #[test]
    fn test_command_with_vars() {
        let mut cfg = config();
        cfg.vars = "PID=/pid".to_string();

        let command = LaunchCommand::from_config(&cfg, "test");
        assert_eq!(command.render(), "PID=/pid QUEUE=test rake  resque:work &");
    }

    #[test]
    fn test_command_with_runner_path() {
        let mut cfg = config();
        cfg.task_runner_path = "/path/to/rake".to_string();

        let command = LaunchCommand::from_config(&cfg, "test");
        assert_eq!(command.render(), " QUEUE=test /path/to/rake  resque:work &");
    }

    #[test]
    fn test_command_with_run_path() {
        let mut cfg = config();
        cfg.run_path = "/path/to/go".to_string();

        let command = LaunchCommand::from_config(&cfg, "test");
        assert_eq!(
            command.render(),
            "cd /path/to/go &&  QUEUE=test rake  resque:work &"
        );
    }

    #[test]
    fn test_command_override_wins() {
        let mut cfg = config();
        cfg.run_path = "/path/to/go".to_string();
        cfg.env = true;
        cfg.vars = "PID=/pid".to_string();
        cfg.command_override = "run this".to_string();

        let command = LaunchCommand::from_config(&cfg, "test");
        assert_eq!(command, LaunchCommand::Override("run this".to_string()));
        assert_eq!(command.render(), "run this");
    }

    #[test]
    fn test_custom_worker_task() {
        let mut cfg = config();
        cfg.worker_task = "jobs:work".to_string();

        let command = LaunchCommand::from_config(&cfg, "mailers");
        assert_eq!(command.render(), " QUEUE=mailers rake  jobs:work &");
    }
}
