//! Wallet queries over the coin CLI.
//!
//! Thin typed wrappers around the coin CLI's RPC commands, built on the
//! lifecycle controller's retrying command runner.

pub mod commands;
pub mod types;

use crate::daemon::LifecycleError;
use std::path::PathBuf;

pub use commands::*;
pub use types::{BlockchainInfo, MnSyncStatus, StakingStatus, WalletInfo, WalletSecurityStatus};

/// Errors raised by wallet queries
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("failed to parse output of '{command}': {source}")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("wallet encryption failed: {output}")]
    EncryptionFailed { output: String },

    #[error("failed to write seed file {path:?}: {source}")]
    SeedFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
