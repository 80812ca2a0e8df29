//! Coin daemon lifecycle management.
//!
//! This module decides whether the coin daemon is running, starts and stops
//! it, and runs coin CLI commands with bounded retry while the daemon warms
//! up. OS access goes through the [`crate::process`] traits so every
//! sequence can be exercised against fakes.

pub mod controller;
pub mod error;
pub mod lock;
pub mod retry;
pub mod state;

use serde::{Deserialize, Serialize};

pub use controller::DaemonController;
pub use error::LifecycleError;
pub use retry::{classify_failure, FailureKind, RetryPolicy, Sleeper, ThreadSleeper};
pub use state::{DaemonEvent, DaemonState};

/// Outcome reported when the daemon outlives the stop polling budget
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopTimeoutBehavior {
    /// Return [`LifecycleError::StopTimedOut`]
    #[default]
    Fail,
    /// Log a warning and report the stop as successful
    ReportSuccess,
}
