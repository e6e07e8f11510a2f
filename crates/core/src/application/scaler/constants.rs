// Scaler constants (No magic values)
use std::time::Duration;

/// How often the scaling loop asks the scaler to maintain requirements (5s)
/// The debounce window (`wait_time`) still decides whether a cycle runs.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How long ShellLauncher waits for the shell before treating the worker
/// as handed off (2 seconds)
/// A shell that exits inside the window has its status checked.
pub const LAUNCH_HANDOFF_MS: u64 = 2_000;
