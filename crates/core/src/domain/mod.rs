// Domain Layer - Pure scaling logic and entities

pub mod decision;
pub mod launch_command;
pub mod queue;
pub mod worker;

// Re-exports
pub use decision::ScaleDecision;
pub use launch_command::LaunchCommand;
pub use queue::QueueName;
pub use worker::{Worker, WorkerId};
