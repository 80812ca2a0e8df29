//! OS process table lookup.
//!
//! Liveness of the coin daemon (and of the wallet manager's own binaries) is
//! decided purely by whether a process with the expected executable name is
//! present. A missing process is `Ok(None)`; only a failure to enumerate at
//! all is an error.

use super::types::ProcessHandle;
use log::debug;
use sysinfo::System;

/// Errors raised while scanning the process table
#[derive(Debug, thiserror::Error)]
pub enum ProcessTableError {
    #[error("process enumeration is not supported on this platform")]
    Unsupported,

    #[error("process table returned no entries")]
    Empty,
}

/// Something that can look processes up by executable name
pub trait ProcessTable {
    /// Find a process whose executable name is exactly `name`.
    ///
    /// When several match, the lowest PID wins so the answer is stable.
    fn find_by_name(&self, name: &str) -> Result<Option<ProcessHandle>, ProcessTableError>;
}

impl<T: ProcessTable + ?Sized> ProcessTable for &T {
    fn find_by_name(&self, name: &str) -> Result<Option<ProcessHandle>, ProcessTableError> {
        (**self).find_by_name(name)
    }
}

/// Process table backed by the operating system
#[derive(Debug, Default)]
pub struct SystemProcessTable;

impl SystemProcessTable {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessTable for SystemProcessTable {
    fn find_by_name(&self, name: &str) -> Result<Option<ProcessHandle>, ProcessTableError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ProcessTableError::Unsupported);
        }

        let mut system = System::new();
        system.refresh_processes();

        let processes = system.processes();
        // Our own process is always listed, so an empty table means the scan failed
        if processes.is_empty() {
            return Err(ProcessTableError::Empty);
        }

        let found = processes
            .iter()
            .filter(|(_, process)| process.name() == name)
            .map(|(pid, process)| ProcessHandle {
                pid: pid.as_u32(),
                name: process.name().to_string(),
            })
            .min_by_key(|handle| handle.pid);

        debug!("Process lookup for {}: {:?}", name, found);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_process_is_none() {
        let table = SystemProcessTable::new();
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return;
        }
        let found = table
            .find_by_name("walletkit-no-such-process-name")
            .unwrap();
        assert!(found.is_none());
    }
}
