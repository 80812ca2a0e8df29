//! Process type definitions.
//!
//! Value types shared between the process table, the command runner and the
//! daemon lifecycle controller.

use crate::coin::{CoinIdentity, Platform};
use std::fmt;

/// A running OS process matched by executable name.
///
/// Handles are never cached: every liveness check re-scans the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid: u32,
    pub name: String,
}

/// Captured result of one CLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// stdout followed by stderr
    pub output: String,
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl CommandResult {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            exit_code: Some(0),
            success: true,
        }
    }

    pub fn failed(output: impl Into<String>, exit_code: i32) -> Self {
        Self {
            output: output.into(),
            exit_code: Some(exit_code),
            success: false,
        }
    }
}

/// Processes the wallet tooling looks for in the process table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    /// Coin daemon, e.g. `divid`
    CoinDaemon,
    /// Coin command-line client, e.g. `divi-cli`
    CoinCli,
    /// Wallet manager CLI front-end, e.g. `godivi`
    AppCli,
    /// Wallet manager server, e.g. `godivis`
    AppServer,
}

impl ProcessRole {
    /// Get the string representation of the process role
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessRole::CoinDaemon => "daemon",
            ProcessRole::CoinCli => "cli",
            ProcessRole::AppCli => "app-cli",
            ProcessRole::AppServer => "app-server",
        }
    }

    /// Executable name this role runs under for a coin and platform
    pub fn binary_name(&self, coin: CoinIdentity, platform: Platform) -> String {
        match self {
            ProcessRole::CoinDaemon => coin.daemon_binary_name(platform),
            ProcessRole::CoinCli => coin.cli_binary_name(platform),
            ProcessRole::AppCli => coin.app_cli_binary_name(platform),
            ProcessRole::AppServer => coin.app_server_binary_name(platform),
        }
    }
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_binary_names() {
        let coin = CoinIdentity::Divi;
        assert_eq!(ProcessRole::CoinDaemon.binary_name(coin, Platform::Linux), "divid");
        assert_eq!(ProcessRole::AppCli.binary_name(coin, Platform::Windows), "godivi.exe");
        assert_eq!(ProcessRole::AppServer.binary_name(coin, Platform::Arm), "godivis");
    }
}
