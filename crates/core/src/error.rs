// Central Error Type for the Director

use thiserror::Error;

/// Director-level error type
///
/// Collaborator failures are wrapped transparently: the registry or launcher
/// error reaches the caller with its own message and source.
#[derive(Error, Debug)]
pub enum DirectorError {
    #[error(transparent)]
    Registry(#[from] crate::port::RegistryError),

    #[error(transparent)]
    Launch(#[from] crate::port::LaunchError),

    #[error("No queue configured for this director")]
    QueueNotConfigured,
}

/// Result type alias using DirectorError
pub type Result<T> = std::result::Result<T, DirectorError>;
