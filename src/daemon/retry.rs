//! Bounded retry of coin CLI commands.
//!
//! A freshly started daemon refuses RPC calls for a while (it is loading the
//! block index, verifying blocks, and so on). CLI commands are therefore
//! retried a fixed number of times with a fixed sleep in between. Failures
//! that can never succeed on retry, such as an unknown RPC method or a wrong
//! passphrase, end the loop immediately.

use super::error::LifecycleError;
use crate::process::{CommandResult, CommandRunner};
use crate::progress::ProgressReporter;
use log::{debug, warn};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Output fragments of a daemon that is up but not yet serving RPC
const WARMUP_MARKERS: [&str; 10] = [
    "couldn't connect to server",
    "error code: -28",
    "loading block index",
    "loading wallet",
    "verifying blocks",
    "verifying wallet",
    "rewinding blocks",
    "activating best chain",
    "loading addresses",
    "loading sporks",
];

/// Output fragments of a request the daemon will never accept
const REJECTION_MARKERS: [&str; 13] = [
    "method not found",
    "error code: -32601",
    "invalid parameter",
    "error code: -8",
    "passphrase entered was incorrect",
    "error code: -14",
    "error parsing json",
    "too few parameters",
    // Wallet in the wrong encryption state for the call
    "error code: -15",
    "running with an unencrypted wallet",
    "running with an encrypted wallet",
    "error code: -17",
    "wallet is already unlocked",
];

/// How a failed CLI attempt is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Daemon still starting; try again after a sleep
    WarmingUp,
    /// Retrying cannot help
    Rejected,
    /// Unrecognized failure; retried like a warm-up
    Unclassified,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FailureKind::Rejected)
    }
}

/// Classify the combined output of a failed CLI invocation
pub fn classify_failure(output: &str) -> FailureKind {
    let lowered = output.to_lowercase();
    if WARMUP_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        FailureKind::WarmingUp
    } else if REJECTION_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        FailureKind::Rejected
    } else {
        FailureKind::Unclassified
    }
}

/// Blocking sleep, replaceable in tests
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

impl<T: Sleeper + ?Sized> Sleeper for &T {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// [`Sleeper`] that blocks the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Attempt budget and pacing of a retried command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

/// Outcome of one attempt inside [`retry_with`]
pub enum Attempt<T> {
    Done(T),
    /// Try again; `detail` becomes the error output if this was the last attempt
    Retry { detail: String },
    Fail(LifecycleError),
}

/// Drive `attempt` until it finishes or the policy's budget is spent.
///
/// Attempt `k` is preceded by exactly `k - 1` sleeps; there is no sleep after
/// the final attempt. A zero budget still makes one attempt.
pub fn retry_with<T, S, F>(
    label: &str,
    policy: RetryPolicy,
    sleeper: &S,
    progress: &mut dyn ProgressReporter,
    waiting_message: &str,
    mut attempt: F,
) -> Result<T, LifecycleError>
where
    S: Sleeper + ?Sized,
    F: FnMut(u32) -> Attempt<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_detail = String::new();

    for number in 1..=max_attempts {
        match attempt(number) {
            Attempt::Done(value) => {
                progress.finish();
                return Ok(value);
            }
            Attempt::Fail(err) => {
                progress.finish();
                return Err(err);
            }
            Attempt::Retry { detail } => {
                debug!("'{}' attempt {}/{} failed: {}", label, number, max_attempts, detail.trim());
                last_detail = detail;
            }
        }

        if number < max_attempts {
            progress.waiting(waiting_message, number, max_attempts);
            sleeper.sleep(policy.interval);
        }
    }

    progress.finish();
    warn!("'{}' gave up after {} attempt(s)", label, max_attempts);
    Err(LifecycleError::CommandRetryExhausted {
        command: label.to_string(),
        attempts: max_attempts,
        last_output: last_detail,
    })
}

/// Run `binary args...` until it exits successfully, returning its output.
///
/// Launch failures (missing binary, permission denied) are not retried.
pub fn run_with_retry<R, S>(
    runner: &R,
    sleeper: &S,
    progress: &mut dyn ProgressReporter,
    binary: &Path,
    args: &[String],
    waiting_message: &str,
    policy: RetryPolicy,
) -> Result<String, LifecycleError>
where
    R: CommandRunner + ?Sized,
    S: Sleeper + ?Sized,
{
    let label = command_label(args);
    retry_with(&label, policy, sleeper, progress, waiting_message, |_| {
        match runner.run(binary, args) {
            Ok(result) => classify_attempt(&label, result),
            Err(source) => Attempt::Fail(LifecycleError::CommandExecutionFailed {
                binary: binary.to_path_buf(),
                command: label.clone(),
                source,
            }),
        }
    })
}

/// Name used for a command in logs and errors.
///
/// Only the RPC name is kept; later arguments can be passphrases.
pub(super) fn command_label(args: &[String]) -> String {
    args.first().cloned().unwrap_or_default()
}

pub(super) fn classify_attempt(label: &str, result: CommandResult) -> Attempt<String> {
    if result.success {
        return Attempt::Done(result.output);
    }
    match classify_failure(&result.output) {
        FailureKind::Rejected => Attempt::Fail(LifecycleError::CommandRejected {
            command: label.to_string(),
            output: result.output,
        }),
        FailureKind::WarmingUp | FailureKind::Unclassified => Attempt::Retry {
            detail: result.output,
        },
    }
}
