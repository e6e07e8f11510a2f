// Director Infrastructure - System Adapters
// Implements: ProcessLauncher

pub mod shell_launcher;

pub use shell_launcher::ShellLauncher;
