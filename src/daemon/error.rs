use super::state::{DaemonEvent, DaemonState};
use crate::process::ProcessTableError;
use crate::utils::binary::BinaryError;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Errors raised by the daemon lifecycle controller
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("failed to enumerate running processes: {0}")]
    ProcessEnumerationFailed(#[from] ProcessTableError),

    #[error(transparent)]
    Binary(#[from] BinaryError),

    #[error("failed to launch {binary:?}: {source}")]
    LaunchFailed {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read output of {binary:?}: {source}")]
    DaemonOutputFailed {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "{binary:?} did not print startup banner {expected:?} in {lines_read} line(s) of output"
    )]
    DaemonStartupBannerMismatch {
        binary: PathBuf,
        expected: String,
        lines_read: usize,
        /// Non-empty lines that were read instead of the banner
        output: Vec<String>,
    },

    #[error("failed to execute {binary:?} {command}: {source}")]
    CommandExecutionFailed {
        binary: PathBuf,
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' still failing after {attempts} attempt(s): {last_output}")]
    CommandRetryExhausted {
        command: String,
        attempts: u32,
        /// Output of the final attempt, verbatim
        last_output: String,
    },

    #[error("'{command}' was rejected by the daemon: {output}")]
    CommandRejected { command: String, output: String },

    #[error("stop command '{command}' failed: {output}")]
    StopCommandFailed { command: String, output: String },

    #[error("{daemon} (pid {pid}) still running after {polls} polls over {waited:?}")]
    StopTimedOut {
        daemon: String,
        pid: u32,
        polls: u32,
        waited: Duration,
    },

    #[error("invalid daemon state transition: {event:?} while {from:?}")]
    InvalidTransition { from: DaemonState, event: DaemonEvent },

    #[error("failed to acquire lifecycle lock {path:?}: {source}")]
    LockFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LifecycleError {
    /// Daemon output attached to the error, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            LifecycleError::CommandRetryExhausted { last_output, .. } => Some(last_output),
            LifecycleError::CommandRejected { output, .. }
            | LifecycleError::StopCommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}
