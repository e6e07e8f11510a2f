// Application Layer - Scaling use cases

pub mod scaler;

// Re-exports
pub use scaler::{shutdown_channel, Scaler, ScalingLoop, ShutdownSender, ShutdownToken};
