// Director Core - Domain Logic, Configuration & Ports
// NO infrastructure dependencies (Hexagonal Architecture)

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

pub use config::{ConfigStore, DirectorConfig, LogLevel, SetupOptions};
pub use error::{DirectorError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
