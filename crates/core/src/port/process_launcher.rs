// Process Launcher Port
// Abstraction for starting a detached worker process from a shell command

use crate::domain::LaunchCommand;
use async_trait::async_trait;
use thiserror::Error;

/// Launch errors
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Launch command exited with status {code:?}: {command}")]
    NonZeroExit { command: String, code: Option<i32> },

    #[error("IO error: {0}")]
    Io(String),
}

/// Process Launcher trait
///
/// Implementations:
/// - ShellLauncher: runs the command through `sh -c`
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Execute a launch command
    ///
    /// Returns once the command has been handed off. The worker it starts
    /// is not monitored.
    ///
    /// # Errors
    /// - LaunchError::SpawnFailed if the shell cannot be started
    /// - LaunchError::NonZeroExit if the command reports failure
    async fn launch(&self, command: &LaunchCommand) -> Result<(), LaunchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// Records every launched command line
    #[derive(Default)]
    pub struct MockProcessLauncher {
        commands: Arc<Mutex<Vec<String>>>,
        failing_calls: Arc<Mutex<HashSet<usize>>>,
    }

    impl MockProcessLauncher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail the n-th call (zero-based) with `LaunchError::SpawnFailed`
        pub fn fail_call(self, index: usize) -> Self {
            self.failing_calls.lock().unwrap().insert(index);
            self
        }

        /// Every command line received so far, failed attempts included
        pub fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.commands.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProcessLauncher for MockProcessLauncher {
        async fn launch(&self, command: &LaunchCommand) -> Result<(), LaunchError> {
            let index = {
                let mut commands = self.commands.lock().unwrap();
                commands.push(command.render());
                commands.len() - 1
            };

            if self.failing_calls.lock().unwrap().contains(&index) {
                return Err(LaunchError::SpawnFailed(format!("mock failure #{}", index)));
            }
            Ok(())
        }
    }
}
