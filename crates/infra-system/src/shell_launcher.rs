// Shell launcher implementation
// reason: tokio::process so a slow shell never blocks the runtime
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use director_core::application::scaler::constants::LAUNCH_HANDOFF_MS;
use director_core::domain::LaunchCommand;
use director_core::port::process_launcher::{LaunchError, ProcessLauncher};
use director_core::port::TimeProvider;

const DEFAULT_SHELL: &str = "sh";

/// Process launcher that hands each command line to `sh -c`
///
/// The shell runs detached: its own process group, no stdio shared with the
/// director. Assembled commands end in `&`, so the shell exits at once and
/// its status is checked. A foreground override still running after the
/// handoff window is left alone and counts as launched.
pub struct ShellLauncher {
    time_provider: Arc<dyn TimeProvider>,
    shell: String,
    handoff_ms: u64,
}

/// What the launch shell did within the handoff window
enum Handoff {
    Exited(ExitStatus),
    Running,
}

impl ShellLauncher {
    /// Create a launcher using `sh` and the default handoff window
    ///
    /// # Example
    /// ```ignore
    /// let launcher = ShellLauncher::new(Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            time_provider,
            shell: DEFAULT_SHELL.to_string(),
            handoff_ms: LAUNCH_HANDOFF_MS,
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_handoff_ms(mut self, handoff_ms: u64) -> Self {
        self.handoff_ms = handoff_ms;
        self
    }

    /// Spawn the detached shell and wait at most `handoff_ms` for it
    async fn run_shell(&self, line: &str) -> Result<Handoff, LaunchError> {
        let mut command = Command::new(&self.shell);
        command
            .arg("-c")
            .arg(line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Signals sent to the director's group (ctrl-c) must not reach workers
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed(e.to_string()))?;

        match timeout(Duration::from_millis(self.handoff_ms), child.wait()).await {
            Ok(Ok(status)) => Ok(Handoff::Exited(status)),
            Ok(Err(e)) => Err(LaunchError::Io(e.to_string())),
            // Dropping the handle neither kills nor leaks: tokio reaps the child
            Err(_) => Ok(Handoff::Running),
        }
    }
}

#[async_trait]
impl ProcessLauncher for ShellLauncher {
    async fn launch(&self, command: &LaunchCommand) -> Result<(), LaunchError> {
        let line = command.render();
        let start_time = self.time_provider.now_millis();

        info!(
            shell = %self.shell,
            command = %line,
            is_override = command.is_override(),
            "Launching worker"
        );

        let handoff = self.run_shell(&line).await?;
        let duration_ms = self.time_provider.now_millis() - start_time;

        match handoff {
            Handoff::Exited(status) if !status.success() => {
                warn!(
                    command = %line,
                    exit_code = ?status.code(),
                    duration_ms = %duration_ms,
                    "Launch command failed"
                );
                Err(LaunchError::NonZeroExit {
                    command: line,
                    code: status.code(),
                })
            }
            Handoff::Exited(_) => {
                info!(
                    command = %line,
                    duration_ms = %duration_ms,
                    "Launch command handed off"
                );
                Ok(())
            }
            Handoff::Running => {
                info!(
                    command = %line,
                    handoff_ms = self.handoff_ms,
                    "Launch command still running in foreground, leaving it detached"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use director_core::port::time_provider::SystemTimeProvider;

    fn launcher() -> ShellLauncher {
        ShellLauncher::new(Arc::new(SystemTimeProvider))
    }

    #[tokio::test]
    async fn test_launch_success() {
        let result = launcher()
            .launch(&LaunchCommand::Override("true".to_string()))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_launch_non_zero_exit() {
        let result = launcher()
            .launch(&LaunchCommand::Override("exit 3".to_string()))
            .await;

        match result {
            Err(LaunchError::NonZeroExit { command, code }) => {
                assert_eq!(command, "exit 3");
                assert_eq!(code, Some(3));
            }
            other => panic!("expected NonZeroExit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_launch_missing_shell() {
        let result = launcher()
            .with_shell("/definitely/not/a/shell")
            .launch(&LaunchCommand::Override("true".to_string()))
            .await;

        assert!(matches!(result, Err(LaunchError::SpawnFailed(_))));
    }

    #[tokio::test]
    async fn test_foreground_command_outlives_handoff_window() {
        let marker = std::env::temp_dir().join(format!("director-{}.marker", uuid::Uuid::new_v4()));
        let line = format!("sleep 1; touch {}", marker.display());

        let started = std::time::Instant::now();
        let result = launcher()
            .with_handoff_ms(300)
            .launch(&LaunchCommand::Override(line))
            .await;

        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_millis(1_000));
        assert!(!marker.exists());

        // The foreground work was not killed and completes on its own
        for _ in 0..60 {
            if marker.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(marker.exists());
        let _ = std::fs::remove_file(&marker);
    }

    #[tokio::test]
    async fn test_backgrounded_command_returns_quickly() {
        let marker = std::env::temp_dir().join(format!("director-{}.marker", uuid::Uuid::new_v4()));
        let line = format!("(sleep 0.2; touch {}) &", marker.display());

        let started = std::time::Instant::now();
        launcher()
            .with_handoff_ms(1_000)
            .launch(&LaunchCommand::Override(line))
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_millis(1_000));

        // Background job finishes on its own
        for _ in 0..50 {
            if marker.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(marker.exists());
        let _ = std::fs::remove_file(&marker);
    }
}
