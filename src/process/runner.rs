//! Child process execution.
//!
//! The lifecycle controller never calls `std::process` directly. It goes
//! through [`CommandRunner`] so that daemon launches and CLI calls can be
//! replaced by fakes in tests.

use super::types::CommandResult;
use log::{debug, warn};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread;

/// Line-by-line view of a freshly spawned daemon's stdout
pub trait DaemonOutput {
    /// Next line of output without the trailing newline, `None` at EOF
    fn next_line(&mut self) -> io::Result<Option<String>>;

    /// PID of the spawned process, if known
    fn pid(&self) -> Option<u32>;

    /// Stop reading and let the daemon keep running on its own.
    ///
    /// The remaining output is drained in the background so the daemon never
    /// blocks on a full pipe, and the child is reaped once it exits.
    fn detach(self: Box<Self>);

    /// Terminate the daemon and wait for it to exit.
    ///
    /// Used when a start attempt fails, so no half-started daemon is left
    /// behind for the next liveness check to mistake for a running one.
    fn kill(self: Box<Self>);
}

/// Launches coin daemons and runs coin CLI commands
pub trait CommandRunner {
    /// Run `program` with `args` to completion, capturing stdout and stderr
    fn run(&self, program: &Path, args: &[String]) -> io::Result<CommandResult>;

    /// Spawn a long-running daemon with a piped stdout
    fn spawn_daemon(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn DaemonOutput>>;

    /// Start `program` in the background without observing its output
    fn launch_detached(&self, program: &Path, args: &[String]) -> io::Result<()>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<CommandResult> {
        (**self).run(program, args)
    }

    fn spawn_daemon(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn DaemonOutput>> {
        (**self).spawn_daemon(program, args)
    }

    fn launch_detached(&self, program: &Path, args: &[String]) -> io::Result<()> {
        (**self).launch_detached(program, args)
    }
}

/// [`CommandRunner`] backed by real OS processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<CommandResult> {
        debug!("Running {:?} {}", program, args.join(" "));
        let output = Command::new(program).args(args).output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandResult {
            output: combined,
            exit_code: output.status.code(),
            success: output.status.success(),
        })
    }

    fn spawn_daemon(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn DaemonOutput>> {
        debug!("Spawning daemon {:?}", program);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "daemon stdout was not captured"))?;

        Ok(Box::new(ChildOutput {
            child,
            reader: BufReader::new(stdout),
        }))
    }

    #[cfg(windows)]
    fn launch_detached(&self, program: &Path, args: &[String]) -> io::Result<()> {
        debug!("Launching {:?} via cmd.exe", program);
        // `start /b` returns as soon as the program is running
        let status = Command::new("cmd.exe")
            .args(["/C", "start", "/b"])
            .arg(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("cmd.exe start exited with {}", status),
            ))
        }
    }

    #[cfg(not(windows))]
    fn launch_detached(&self, program: &Path, args: &[String]) -> io::Result<()> {
        debug!("Launching {:?} in the background", program);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

struct ChildOutput {
    child: Child,
    reader: BufReader<ChildStdout>,
}

impl DaemonOutput for ChildOutput {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    fn pid(&self) -> Option<u32> {
        Some(self.child.id())
    }

    fn detach(self: Box<Self>) {
        let ChildOutput { mut child, mut reader } = *self;
        thread::spawn(move || {
            let mut sink = [0u8; 4096];
            while matches!(reader.read(&mut sink), Ok(n) if n > 0) {}
            if let Err(e) = child.wait() {
                warn!("Failed to reap daemon process {}: {}", child.id(), e);
            }
        });
    }

    fn kill(self: Box<Self>) {
        let ChildOutput { mut child, reader } = *self;
        drop(reader);
        let pid = child.id();
        if let Err(e) = child.kill() {
            // Already exited
            debug!("Could not kill daemon process {}: {}", pid, e);
        }
        if let Err(e) = child.wait() {
            warn!("Failed to reap daemon process {}: {}", pid, e);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_output_and_status() {
        let runner = SystemCommandRunner::new();
        let args = vec!["-c".to_string(), "echo out; echo err 1>&2; exit 3".to_string()];
        let result = runner.run(Path::new("/bin/sh"), &args).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert!(result.output.contains("out"));
        assert!(result.output.contains("err"));
    }

    #[test]
    fn test_spawn_daemon_reads_lines() {
        let runner = SystemCommandRunner::new();
        let args = vec!["-c".to_string(), "printf 'first\\r\\nDIVI server starting\\n'".to_string()];
        let mut output = runner.spawn_daemon(Path::new("/bin/sh"), &args).unwrap();
        assert_eq!(output.next_line().unwrap().as_deref(), Some("first"));
        assert_eq!(output.next_line().unwrap().as_deref(), Some("DIVI server starting"));
        assert_eq!(output.next_line().unwrap(), None);
        output.detach();
    }

    #[test]
    fn test_kill_stops_a_silent_daemon() {
        let runner = SystemCommandRunner::new();
        let args = vec!["-c".to_string(), "echo one; exec sleep 30".to_string()];
        let mut output = runner.spawn_daemon(Path::new("/bin/sh"), &args).unwrap();
        assert_eq!(output.next_line().unwrap().as_deref(), Some("one"));

        let started = std::time::Instant::now();
        output.kill();
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let runner = SystemCommandRunner::new();
        assert!(runner.run(Path::new("/nonexistent/divi-cli"), &[]).is_err());
    }
}
