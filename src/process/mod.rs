//! Process access module.
//!
//! This module wraps the two OS facilities the lifecycle controller needs:
//! scanning the process table by executable name, and running child
//! processes (one-shot CLI commands, banner-printing daemons, and detached
//! background launches).

pub mod runner;
pub mod table;
pub mod types;

// Re-export commonly used types for convenience
pub use runner::{CommandRunner, DaemonOutput, SystemCommandRunner};
pub use table::{ProcessTable, ProcessTableError, SystemProcessTable};
pub use types::{CommandResult, ProcessHandle, ProcessRole};
