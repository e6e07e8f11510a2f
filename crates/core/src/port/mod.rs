// Port Layer - Interfaces for external collaborators

pub mod log_sink;
pub mod process_launcher;
pub mod time_provider; // For deterministic debounce tests
pub mod worker_registry;

// Re-exports
pub use log_sink::{LogSink, TracingLogSink};
pub use process_launcher::{LaunchError, ProcessLauncher};
pub use time_provider::TimeProvider;
pub use worker_registry::{RegistryError, WorkerRegistry};
