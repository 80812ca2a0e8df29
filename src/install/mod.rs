//! Coin release installation.
//!
//! Downloads a coin's release archive, unpacks the daemon, CLI and tx
//! binaries into the wallet manager's bin folder, and writes the daemon's
//! initial RPC configuration.

pub mod archive;
pub mod download;
pub mod installer;
pub mod rpc_conf;

use crate::utils::binary::BinaryError;
use std::io;
use std::path::PathBuf;

pub use archive::{extract_archive, find_file, ArchiveKind};
pub use download::{create_client, download_file};
pub use installer::{
    install_app, install_app_from_archive, install_coin, install_from_archive, install_self, InstallReport,
};
pub use rpc_conf::{parse_rpc_credentials, run_initial_daemon, write_coin_conf, RpcCredentials};

/// Errors raised while installing coin binaries
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("HTTP request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid zip archive {path:?}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("unsupported archive type: {0}")]
    UnsupportedArchive(String),

    #[error("{name} not found in extracted archive under {root:?}")]
    MissingBinary { name: String, root: PathBuf },

    #[error("daemon output did not contain rpcuser/rpcpassword suggestions")]
    MissingRpcCredentials,

    #[error(transparent)]
    Binary(#[from] BinaryError),
}

impl InstallError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> InstallError {
        let path = path.into();
        move |source| InstallError::Io { path, source }
    }
}
