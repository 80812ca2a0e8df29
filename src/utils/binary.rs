//! Binary and folder path resolution.
//!
//! This module maps a coin identity and platform to the folders the wallet
//! manager installs into and the coin daemon keeps its data in, and validates
//! that binaries exist and are executable before we try to launch them.

use crate::coin::{CoinIdentity, Platform};
use std::path::{Path, PathBuf};

/// Components under the user's home that hold roaming app data on Windows
const WINDOWS_ROAMING_DIR: [&str; 2] = ["appdata", "roaming"];

/// Errors that can occur during binary resolution or validation
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    #[error("Binary not found: {path}")]
    NotFound { path: String },

    #[error("Binary is not executable: {path}")]
    NotExecutable { path: String },

    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },
}

/// Folder layout for one coin on one platform, rooted at a home directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinPaths {
    pub coin: CoinIdentity,
    pub platform: Platform,
    home: PathBuf,
}

impl CoinPaths {
    /// Build the layout rooted at an explicit home directory
    pub fn new(coin: CoinIdentity, platform: Platform, home: impl Into<PathBuf>) -> Self {
        Self {
            coin,
            platform,
            home: home.into(),
        }
    }

    /// Build the layout rooted at the current user's home directory
    pub fn for_current_user(coin: CoinIdentity, platform: Platform) -> Result<Self, BinaryError> {
        let home = dirs::home_dir().ok_or(BinaryError::NoHomeDir)?;
        Ok(Self::new(coin, platform, home))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    fn user_data_root(&self) -> PathBuf {
        if self.platform.is_windows() {
            WINDOWS_ROAMING_DIR
                .iter()
                .fold(self.home.clone(), |path, part| path.join(part))
        } else {
            self.home.clone()
        }
    }

    /// Folder holding the coin and wallet manager binaries, e.g. `~/godivi`
    pub fn apps_bin_folder(&self) -> PathBuf {
        self.user_data_root().join(self.coin.bin_dir_name(self.platform))
    }

    /// Coin daemon data folder, e.g. `~/.divi`
    pub fn coin_home_folder(&self) -> PathBuf {
        self.user_data_root().join(self.coin.home_dir_name(self.platform))
    }

    /// Daemon configuration file inside the coin home folder
    pub fn coin_conf_file(&self) -> PathBuf {
        self.coin_home_folder().join(self.coin.conf_file())
    }

    pub fn daemon_binary(&self) -> PathBuf {
        self.apps_bin_folder().join(self.coin.daemon_binary_name(self.platform))
    }

    pub fn cli_binary(&self) -> PathBuf {
        self.apps_bin_folder().join(self.coin.cli_binary_name(self.platform))
    }

    pub fn tx_binary(&self) -> PathBuf {
        self.apps_bin_folder().join(self.coin.tx_binary_name(self.platform))
    }

    pub fn app_server_binary(&self) -> PathBuf {
        self.apps_bin_folder().join(self.coin.app_server_binary_name(self.platform))
    }

    pub fn seed_file(&self) -> PathBuf {
        self.apps_bin_folder().join(self.coin.descriptor().seed_file)
    }

    /// Lock file used to serialize daemon start/stop across processes
    pub fn lifecycle_lock_file(&self) -> PathBuf {
        self.apps_bin_folder()
            .join(format!(".{}-lifecycle.lock", self.coin.as_str()))
    }

    /// Whether the wallet manager has been installed (the bin folder exists)
    pub fn is_installed(&self) -> bool {
        self.apps_bin_folder().is_dir()
    }
}

/// Validate that a binary exists and is executable.
///
/// This should be called before launching the daemon or CLI so that a missing
/// install is reported as such instead of as a generic spawn failure.
pub fn validate_binary(path: &Path) -> Result<(), BinaryError> {
    if !path.exists() {
        return Err(BinaryError::NotFound {
            path: path.display().to_string(),
        });
    }

    let metadata = path.metadata().map_err(|_| BinaryError::InvalidPath {
        path: path.display().to_string(),
    })?;

    if !metadata.is_file() {
        return Err(BinaryError::InvalidPath {
            path: path.display().to_string(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        // Any execute bit will do
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(BinaryError::NotExecutable {
                path: path.display().to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unix_layout() {
        let paths = CoinPaths::new(CoinIdentity::Divi, Platform::Linux, "/home/alice");
        assert_eq!(paths.apps_bin_folder(), PathBuf::from("/home/alice/godivi"));
        assert_eq!(paths.coin_home_folder(), PathBuf::from("/home/alice/.divi"));
        assert_eq!(paths.daemon_binary(), PathBuf::from("/home/alice/godivi/divid"));
        assert_eq!(paths.coin_conf_file(), PathBuf::from("/home/alice/.divi/divi.conf"));
    }

    #[test]
    fn test_windows_layout() {
        let paths = CoinPaths::new(CoinIdentity::Phore, Platform::Windows, "/home/bob");
        assert_eq!(
            paths.apps_bin_folder(),
            PathBuf::from("/home/bob/appdata/roaming/BoxPhore")
        );
        assert_eq!(
            paths.coin_home_folder(),
            PathBuf::from("/home/bob/appdata/roaming/PHORE")
        );
        assert!(paths.cli_binary().ends_with("phore-cli.exe"));
    }

    #[test]
    fn test_is_installed_tracks_bin_folder() {
        let home = TempDir::new().unwrap();
        let paths = CoinPaths::new(CoinIdentity::Pivx, Platform::Linux, home.path());
        assert!(!paths.is_installed());

        std::fs::create_dir_all(paths.apps_bin_folder()).unwrap();
        assert!(paths.is_installed());
    }

    #[test]
    fn test_validate_missing_binary() {
        let dir = TempDir::new().unwrap();
        let err = validate_binary(&dir.path().join("divid")).unwrap_err();
        assert!(matches!(err, BinaryError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_requires_execute_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("divid");
        std::fs::write(&binary, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(matches!(
            validate_binary(&binary),
            Err(BinaryError::NotExecutable { .. })
        ));

        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(validate_binary(&binary).is_ok());
    }
}
