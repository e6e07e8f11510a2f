// Director Infrastructure - Redis Adapter
// Implements: WorkerRegistry over Resque's worker keys, stopping local workers with QUIT

mod keys;
mod registry;
mod signal;

pub use keys::{ResqueKeys, DEFAULT_NAMESPACE};
pub use registry::ResqueRegistry;
pub use signal::{local_hostname, quit_worker, QuitOutcome};
