//! Coin daemon lifecycle controller.
//!
//! [`DaemonController`] answers whether the coin daemon is running, starts
//! it and waits for its startup banner, stops it through the coin CLI and
//! polls until the process is gone, and runs CLI commands with bounded
//! retry while the daemon warms up.
//!
//! Liveness is never cached. Every check re-scans the process table, so a
//! daemon started or killed outside this process is always seen correctly.

use super::error::LifecycleError;
use super::lock::LifecycleLock;
use super::retry::{classify_attempt, command_label, retry_with, run_with_retry, Attempt, RetryPolicy};
use super::retry::{Sleeper, ThreadSleeper};
use super::state::{DaemonEvent, DaemonState};
use super::StopTimeoutBehavior;
use crate::coin::CoinIdentity;
use crate::config::LifecycleSettings;
use crate::process::{CommandRunner, ProcessHandle, ProcessRole, ProcessTable};
use crate::progress::{ProgressReporter, SilentProgress};
use crate::utils::binary::{validate_binary, CoinPaths};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<X: ?Sized>(mutex: &Mutex<X>) -> MutexGuard<'_, X> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn owned_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

/// Starts, stops and queries one coin daemon
pub struct DaemonController<T, R, S = ThreadSleeper> {
    paths: CoinPaths,
    settings: LifecycleSettings,
    table: T,
    runner: R,
    sleeper: S,
    lock_file: Option<PathBuf>,
    state: Mutex<DaemonState>,
    /// Held for the whole of a start or stop
    sequence: Mutex<()>,
    progress: Mutex<Box<dyn ProgressReporter>>,
}

impl<T, R> DaemonController<T, R, ThreadSleeper>
where
    T: ProcessTable,
    R: CommandRunner,
{
    /// Create a controller for the coin and platform described by `paths`.
    ///
    /// # Arguments
    /// * `paths` - Folder layout resolving daemon and CLI binaries
    /// * `settings` - Retry and polling budgets
    /// * `table` - Process table used for liveness checks
    /// * `runner` - Executes the daemon and CLI
    pub fn new(paths: CoinPaths, settings: LifecycleSettings, table: T, runner: R) -> Self {
        Self {
            paths,
            settings,
            table,
            runner,
            sleeper: ThreadSleeper,
            lock_file: None,
            state: Mutex::new(DaemonState::NotRunning),
            sequence: Mutex::new(()),
            progress: Mutex::new(Box::new(SilentProgress)),
        }
    }
}

impl<T, R, S> DaemonController<T, R, S>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    /// Replace the sleeper used between retries and stop polls
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> DaemonController<T, R, S2> {
        DaemonController {
            paths: self.paths,
            settings: self.settings,
            table: self.table,
            runner: self.runner,
            sleeper,
            lock_file: self.lock_file,
            state: self.state,
            sequence: self.sequence,
            progress: self.progress,
        }
    }

    /// Serialize start and stop across processes through `path`
    pub fn with_lock_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_file = Some(path.into());
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = Mutex::new(progress);
        self
    }

    pub fn coin(&self) -> CoinIdentity {
        self.paths.coin
    }

    pub fn paths(&self) -> &CoinPaths {
        &self.paths
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    /// Last observed lifecycle state
    pub fn state(&self) -> DaemonState {
        *lock(&self.state)
    }

    fn daemon_name(&self) -> String {
        ProcessRole::CoinDaemon.binary_name(self.paths.coin, self.paths.platform)
    }

    fn apply(&self, event: DaemonEvent) -> Result<DaemonState, LifecycleError> {
        let mut state = lock(&self.state);
        let next = state.on(event)?;
        debug!("Daemon state {:?} -> {:?} on {:?}", *state, next, event);
        *state = next;
        Ok(next)
    }

    fn find_process(&self, name: &str) -> Result<Option<ProcessHandle>, LifecycleError> {
        Ok(self.table.find_by_name(name)?)
    }

    fn scan_and_observe(&self) -> Result<Option<ProcessHandle>, LifecycleError> {
        let found = self.find_process(&self.daemon_name())?;
        self.apply(DaemonEvent::Observed {
            running: found.is_some(),
        })?;
        Ok(found)
    }

    /// Check whether the coin daemon is running.
    ///
    /// Returns the matching process, or `None` when no process with the
    /// daemon's executable name exists. Fails only if the process table
    /// cannot be read.
    pub fn is_running(&self) -> Result<Option<ProcessHandle>, LifecycleError> {
        let found = self.find_process(&self.daemon_name())?;
        // A start or stop in progress on another thread owns the state
        if let Ok(_idle) = self.sequence.try_lock() {
            let mut state = lock(&self.state);
            if let Ok(next) = state.on(DaemonEvent::Observed {
                running: found.is_some(),
            }) {
                *state = next;
            }
        }
        Ok(found)
    }

    /// Check whether a process for `role` is running
    pub fn is_process_running(&self, role: ProcessRole) -> Result<Option<ProcessHandle>, LifecycleError> {
        self.find_process(&role.binary_name(self.paths.coin, self.paths.platform))
    }

    /// Check whether the wallet manager CLI front-end is running
    pub fn is_app_cli_running(&self) -> Result<Option<ProcessHandle>, LifecycleError> {
        self.is_process_running(ProcessRole::AppCli)
    }

    /// Check whether the wallet manager server is running
    pub fn is_app_server_running(&self) -> Result<Option<ProcessHandle>, LifecycleError> {
        self.is_process_running(ProcessRole::AppServer)
    }

    /// Start the coin daemon if it is not already running.
    ///
    /// On Windows the daemon is launched detached and this returns as soon as
    /// the launch was issued. Elsewhere the daemon's stdout is read until the
    /// coin's startup banner appears or `banner_line_limit` non-empty lines
    /// have gone by without it, in which case the spawned daemon is killed.
    pub fn start(&self, display_progress: bool) -> Result<(), LifecycleError> {
        let _sequence = lock(&self.sequence);
        let _lock = LifecycleLock::acquire(self.lock_file.as_deref())?;

        if let Some(handle) = self.scan_and_observe()? {
            debug!("{} already running with pid {}", handle.name, handle.pid);
            return Ok(());
        }

        let binary = self.paths.daemon_binary();
        validate_binary(&binary)?;

        let name = self.daemon_name();
        if display_progress {
            info!("Attempting to run the {} daemon...", name);
        } else {
            debug!("Starting {} from {:?}", name, binary);
        }

        self.apply(DaemonEvent::LaunchIssued)?;
        let detached = self.paths.platform.is_windows();
        let launched = if detached {
            self.runner
                .launch_detached(&binary, &[])
                .map_err(|source| LifecycleError::LaunchFailed {
                    binary: binary.clone(),
                    source,
                })
        } else {
            self.await_banner(&binary)
        };

        match launched {
            Ok(()) => {
                if !detached {
                    self.apply(DaemonEvent::BannerObserved)?;
                }
                if display_progress {
                    info!("{} daemon started", name);
                }
                Ok(())
            }
            Err(err) => {
                self.apply(DaemonEvent::StartFailed)?;
                Err(err)
            }
        }
    }

    fn await_banner(&self, binary: &Path) -> Result<(), LifecycleError> {
        let mut output = self
            .runner
            .spawn_daemon(binary, &[])
            .map_err(|source| LifecycleError::LaunchFailed {
                binary: binary.to_path_buf(),
                source,
            })?;

        let expected = self.paths.coin.startup_banner();
        let limit = self.settings.banner_line_limit.max(1);
        let mut seen = Vec::new();

        while seen.len() < limit {
            let line = match output.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(source) => {
                    output.kill();
                    return Err(LifecycleError::DaemonOutputFailed {
                        binary: binary.to_path_buf(),
                        source,
                    });
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == expected {
                debug!("{:?} printed its startup banner (pid {:?})", binary, output.pid());
                output.detach();
                return Ok(());
            }
            seen.push(line.to_string());
        }

        debug!("No startup banner from {:?}, killing it", binary);
        output.kill();
        Err(LifecycleError::DaemonStartupBannerMismatch {
            binary: binary.to_path_buf(),
            expected: expected.to_string(),
            lines_read: seen.len(),
            output: seen,
        })
    }

    /// Stop the coin daemon if it is running.
    ///
    /// Issues `<cli> stop` once, then polls the process table up to
    /// `stop_max_polls` times, sleeping `stop_poll_interval` after each poll
    /// that still finds the daemon. Not running at all is success.
    pub fn stop(&self) -> Result<(), LifecycleError> {
        let _sequence = lock(&self.sequence);
        let _lock = LifecycleLock::acquire(self.lock_file.as_deref())?;

        let Some(handle) = self.scan_and_observe()? else {
            debug!("{} is not running, nothing to stop", self.daemon_name());
            return Ok(());
        };

        let cli = self.paths.cli_binary();
        validate_binary(&cli)?;

        let command = "stop";
        let result = self
            .runner
            .run(&cli, &owned_args(&[command]))
            .map_err(|source| LifecycleError::CommandExecutionFailed {
                binary: cli.clone(),
                command: command.to_string(),
                source,
            })?;
        if !result.success {
            return Err(LifecycleError::StopCommandFailed {
                command: command.to_string(),
                output: result.output,
            });
        }

        self.apply(DaemonEvent::StopIssued)?;
        info!("Stopping {} (pid {})", handle.name, handle.pid);

        let name = self.daemon_name();
        let waiting_message = format!("Waiting for {} to stop", name);
        let max_polls = self.settings.stop_max_polls.max(1);
        let mut progress = lock(&self.progress);

        for poll in 1..=max_polls {
            if self.find_process(&name)?.is_none() {
                progress.finish();
                self.apply(DaemonEvent::ProcessGone)?;
                info!("{} stopped", name);
                return Ok(());
            }
            progress.waiting(&waiting_message, poll, max_polls);
            self.sleeper.sleep(self.settings.stop_poll_interval);
        }

        progress.finish();
        self.apply(DaemonEvent::StopTimedOut)?;
        let waited = self.settings.stop_poll_interval * max_polls;

        match self.settings.stop_timeout_behavior {
            StopTimeoutBehavior::Fail => Err(LifecycleError::StopTimedOut {
                daemon: name,
                pid: handle.pid,
                polls: max_polls,
                waited,
            }),
            StopTimeoutBehavior::ReportSuccess => {
                warn!(
                    "{} (pid {}) still running after {:?}, reporting stop as successful",
                    name, handle.pid, waited
                );
                Ok(())
            }
        }
    }

    /// Run `binary args...`, retrying while it fails, and return its output.
    ///
    /// # Arguments
    /// * `binary` - Executable to run, usually the coin CLI
    /// * `args` - Arguments passed as-is
    /// * `waiting_message` - Shown between attempts
    /// * `max_attempts` - Total attempts; attempt `k` follows `k - 1` sleeps
    pub fn run_command(
        &self,
        binary: &Path,
        args: &[&str],
        waiting_message: &str,
        max_attempts: u32,
    ) -> Result<String, LifecycleError> {
        let mut progress = lock(&self.progress);
        run_with_retry(
            &self.runner,
            &self.sleeper,
            &mut **progress,
            binary,
            &owned_args(args),
            waiting_message,
            RetryPolicy::new(max_attempts, self.settings.cli_retry_interval),
        )
    }

    /// Run a single-word coin CLI command such as `getwalletinfo`
    pub fn run_cli_command(
        &self,
        command: &str,
        waiting_message: &str,
        max_attempts: u32,
    ) -> Result<String, LifecycleError> {
        self.run_command(&self.paths.cli_binary(), &[command], waiting_message, max_attempts)
    }

    /// Run a coin CLI command that takes one value, e.g. `encryptwallet <pw>`
    pub fn run_cli_command_with_value(
        &self,
        command: &str,
        value: &str,
        waiting_message: &str,
        max_attempts: u32,
    ) -> Result<String, LifecycleError> {
        self.run_command(
            &self.paths.cli_binary(),
            &[command, value],
            waiting_message,
            max_attempts,
        )
    }

    /// Run a coin CLI command and decode its JSON output.
    ///
    /// Output that does not decode is retried like a failed command, since
    /// a warming-up daemon can answer with a status line instead of JSON.
    pub fn query_cli_json<D: DeserializeOwned>(
        &self,
        args: &[&str],
        waiting_message: &str,
        max_attempts: u32,
    ) -> Result<D, LifecycleError> {
        let binary = self.paths.cli_binary();
        let args = owned_args(args);
        let label = command_label(&args);
        let policy = RetryPolicy::new(max_attempts, self.settings.cli_retry_interval);
        let mut progress = lock(&self.progress);

        retry_with(&label, policy, &self.sleeper, &mut **progress, waiting_message, |_| {
            let result = match self.runner.run(&binary, &args) {
                Ok(result) => result,
                Err(source) => {
                    return Attempt::Fail(LifecycleError::CommandExecutionFailed {
                        binary: binary.clone(),
                        command: label.clone(),
                        source,
                    })
                }
            };
            match classify_attempt(&label, result) {
                Attempt::Done(output) => match serde_json::from_str(&output) {
                    Ok(value) => Attempt::Done(value),
                    Err(e) => Attempt::Retry {
                        detail: format!("unparseable output ({}): {}", e, output),
                    },
                },
                Attempt::Retry { detail } => Attempt::Retry { detail },
                Attempt::Fail(err) => Attempt::Fail(err),
            }
        })
    }

    /// Launch the wallet manager server in the background if it is not running
    pub fn run_app_server(&self) -> Result<(), LifecycleError> {
        if let Some(handle) = self.is_app_server_running()? {
            debug!("{} already running with pid {}", handle.name, handle.pid);
            return Ok(());
        }

        let binary = self.paths.app_server_binary();
        validate_binary(&binary)?;
        info!("Starting {:?}", binary);
        self.runner
            .launch_detached(&binary, &[])
            .map_err(|source| LifecycleError::LaunchFailed { binary, source })
    }
}
