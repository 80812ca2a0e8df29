//! Coin identities and per-coin naming.
//!
//! A wallet manager instance serves exactly one coin. The selected
//! [`CoinIdentity`] is read once from the config file and then used to look up
//! binary names, folders, banners and download links from a single descriptor
//! table.
//!
//! ```
//! use walletkit::coin::{CoinIdentity, Platform};
//!
//! let coin = CoinIdentity::Divi;
//! assert_eq!(coin.daemon_binary_name(Platform::Linux), "divid");
//! assert_eq!(coin.cli_binary_name(Platform::Windows), "divi-cli.exe");
//! assert_eq!(coin.startup_banner(), "DIVI server starting");
//! ```

pub mod platform;
pub mod table;

pub use platform::Platform;
pub use table::{CoinDescriptor, ReleaseFiles};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which cryptocurrency project this tool instance manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CoinIdentity {
    Divi,
    Phore,
    Pivx,
    Trezarcoin,
}

/// A release download split into the base URL and the file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub base_url: String,
    pub file_name: String,
}

impl DownloadLink {
    /// Full URL of the download
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.file_name)
    }
}

impl CoinIdentity {
    /// All coins, in table order
    pub const ALL: [CoinIdentity; 4] = [
        CoinIdentity::Divi,
        CoinIdentity::Phore,
        CoinIdentity::Pivx,
        CoinIdentity::Trezarcoin,
    ];

    /// Descriptor table entry for this coin
    pub fn descriptor(&self) -> &'static CoinDescriptor {
        match self {
            CoinIdentity::Divi => &table::DIVI,
            CoinIdentity::Phore => &table::PHORE,
            CoinIdentity::Pivx => &table::PIVX,
            CoinIdentity::Trezarcoin => &table::TREZARCOIN,
        }
    }

    pub fn coin_name(&self) -> &'static str {
        self.descriptor().coin_name
    }

    /// Upstream release version installed by [`Self::coin_download_link`]
    pub fn coin_version(&self) -> &'static str {
        self.descriptor().coin_version
    }

    pub fn app_name(&self) -> &'static str {
        self.descriptor().app_name
    }

    /// Coin at position `index` in [`Self::ALL`].
    ///
    /// Older wallet manager config files store the coin as this index.
    pub fn from_index(index: u64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn startup_banner(&self) -> &'static str {
        self.descriptor().startup_banner
    }

    pub fn conf_file(&self) -> &'static str {
        self.descriptor().conf_file
    }

    /// Coin daemon executable, e.g. `divid` or `divid.exe`.
    ///
    /// This is the exact name the lifecycle controller searches the process
    /// table for.
    pub fn daemon_binary_name(&self, platform: Platform) -> String {
        platform.executable_name(self.descriptor().daemon_stem)
    }

    /// Coin CLI executable, e.g. `divi-cli`
    pub fn cli_binary_name(&self, platform: Platform) -> String {
        platform.executable_name(self.descriptor().cli_stem)
    }

    /// Coin transaction tool executable, e.g. `divi-tx`
    pub fn tx_binary_name(&self, platform: Platform) -> String {
        platform.executable_name(self.descriptor().tx_stem)
    }

    /// Wallet manager CLI executable, e.g. `godivi`
    pub fn app_cli_binary_name(&self, platform: Platform) -> String {
        platform.executable_name(self.descriptor().app_cli_stem)
    }

    /// Wallet manager server executable, e.g. `godivis`
    pub fn app_server_binary_name(&self, platform: Platform) -> String {
        platform.executable_name(self.descriptor().app_server_stem)
    }

    pub fn app_updater_binary_name(&self, platform: Platform) -> String {
        platform.executable_name(self.descriptor().app_updater_stem)
    }

    /// Coin home folder name (relative to the user's home / roaming app data)
    pub fn home_dir_name(&self, platform: Platform) -> &'static str {
        let descriptor = self.descriptor();
        if platform.is_windows() {
            descriptor.home_dir_windows
        } else {
            descriptor.home_dir
        }
    }

    /// Wallet manager binary folder name
    pub fn bin_dir_name(&self, platform: Platform) -> &'static str {
        let descriptor = self.descriptor();
        if platform.is_windows() {
            descriptor.bin_dir_windows
        } else {
            descriptor.bin_dir
        }
    }

    /// Upstream coin release archive for a platform
    pub fn coin_download_link(&self, platform: Platform) -> DownloadLink {
        release_link(&self.descriptor().coin_release, platform)
    }

    /// Wallet manager release archive for a platform
    pub fn app_download_link(&self, platform: Platform) -> DownloadLink {
        release_link(&self.descriptor().app_release, platform)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoinIdentity::Divi => "divi",
            CoinIdentity::Phore => "phore",
            CoinIdentity::Pivx => "pivx",
            CoinIdentity::Trezarcoin => "trezarcoin",
        }
    }
}

fn release_link(files: &ReleaseFiles, platform: Platform) -> DownloadLink {
    let file_name = match platform {
        Platform::Arm => files.arm,
        Platform::Linux => files.linux,
        Platform::Windows => files.windows,
    };
    DownloadLink {
        base_url: files.base_url.to_string(),
        file_name: file_name.to_string(),
    }
}

impl fmt::Display for CoinIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.coin_name())
    }
}

/// Error returned when a coin name is not recognised
#[derive(Debug, thiserror::Error)]
#[error("Unknown coin: {0}")]
pub struct UnknownCoin(pub String);

impl FromStr for CoinIdentity {
    type Err = UnknownCoin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "divi" => Ok(CoinIdentity::Divi),
            "phore" => Ok(CoinIdentity::Phore),
            "pivx" => Ok(CoinIdentity::Pivx),
            "trezarcoin" | "trezar" => Ok(CoinIdentity::Trezarcoin),
            _ => Err(UnknownCoin(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_daemon_names_are_deterministic() {
        for coin in CoinIdentity::ALL {
            for platform in [Platform::Arm, Platform::Linux, Platform::Windows] {
                assert_eq!(
                    coin.daemon_binary_name(platform),
                    coin.daemon_binary_name(platform)
                );
            }
        }
    }

    #[test]
    fn test_known_binary_names() {
        assert_eq!(CoinIdentity::Divi.daemon_binary_name(Platform::Linux), "divid");
        assert_eq!(CoinIdentity::Phore.cli_binary_name(Platform::Linux), "phore-cli");
        assert_eq!(CoinIdentity::Pivx.daemon_binary_name(Platform::Windows), "pivxd.exe");
        assert_eq!(CoinIdentity::Trezarcoin.tx_binary_name(Platform::Arm), "trezarcoin-tx");
        assert_eq!(CoinIdentity::Divi.app_server_binary_name(Platform::Linux), "godivis");
    }

    #[test]
    fn test_daemon_names_unique_across_coins() {
        let names: HashSet<String> = CoinIdentity::ALL
            .iter()
            .map(|coin| coin.daemon_binary_name(Platform::Linux))
            .collect();
        assert_eq!(names.len(), CoinIdentity::ALL.len());
    }

    #[test]
    fn test_home_dirs_switch_on_windows() {
        assert_eq!(CoinIdentity::Divi.home_dir_name(Platform::Linux), ".divi");
        assert_eq!(CoinIdentity::Divi.home_dir_name(Platform::Windows), "DIVI");
        assert_eq!(CoinIdentity::Phore.bin_dir_name(Platform::Windows), "BoxPhore");
    }

    #[test]
    fn test_download_links() {
        let link = CoinIdentity::Divi.coin_download_link(Platform::Arm);
        assert_eq!(link.file_name, "divi-1.0.8-RPi2.tar.gz");
        assert_eq!(
            link.url(),
            "https://github.com/DiviProject/Divi/releases/download/v1.0.8/divi-1.0.8-RPi2.tar.gz"
        );

        let app = CoinIdentity::Trezarcoin.app_download_link(Platform::Windows);
        assert_eq!(app.file_name, "gotrezarcoin-windows-latest.zip");
    }

    #[test]
    fn test_banner_names_the_project() {
        for coin in CoinIdentity::ALL {
            assert!(coin.startup_banner().ends_with("server starting"));
        }
    }

    #[test]
    fn test_parse_coin_identity() {
        assert_eq!("Divi".parse::<CoinIdentity>().unwrap(), CoinIdentity::Divi);
        assert_eq!(" PIVX ".parse::<CoinIdentity>().unwrap(), CoinIdentity::Pivx);
        assert_eq!("trezar".parse::<CoinIdentity>().unwrap(), CoinIdentity::Trezarcoin);
        assert!("dogecoin".parse::<CoinIdentity>().is_err());
    }

    #[test]
    fn test_from_index_follows_table_order() {
        assert_eq!(CoinIdentity::from_index(0), Some(CoinIdentity::Divi));
        assert_eq!(CoinIdentity::from_index(3), Some(CoinIdentity::Trezarcoin));
        assert_eq!(CoinIdentity::from_index(4), None);
        assert_eq!(CoinIdentity::Divi.coin_version(), "1.08");
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let yaml = serde_yaml::to_string(&CoinIdentity::Trezarcoin).unwrap();
        assert_eq!(yaml.trim(), "trezarcoin");
        let coin: CoinIdentity = serde_json::from_str("\"phore\"").unwrap();
        assert_eq!(coin, CoinIdentity::Phore);
    }
}
