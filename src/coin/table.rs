//! Static descriptor table, one entry per supported coin.
//!
//! Every per-coin constant lives here. Accessors in the parent module look
//! entries up by [`CoinIdentity`](super::CoinIdentity) instead of branching
//! on the coin at each call site.

/// Release archive file names for each platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseFiles {
    pub base_url: &'static str,
    pub arm: &'static str,
    pub linux: &'static str,
    pub windows: &'static str,
}

/// Everything the tooling needs to know about one coin project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinDescriptor {
    /// Human readable coin name, e.g. "Divi"
    pub coin_name: &'static str,
    /// Version of the upstream coin release we install
    pub coin_version: &'static str,
    /// Wallet manager app name, e.g. "GoDivi"
    pub app_name: &'static str,
    pub app_cli_name: &'static str,
    pub app_server_name: &'static str,
    pub app_updater_name: &'static str,
    /// Home folder of the coin daemon, relative to the user's home
    pub home_dir: &'static str,
    pub home_dir_windows: &'static str,
    /// Folder the wallet manager installs binaries into
    pub bin_dir: &'static str,
    pub bin_dir_windows: &'static str,
    /// Daemon configuration file inside the coin home folder
    pub conf_file: &'static str,
    /// Binary stems, without the platform executable suffix
    pub daemon_stem: &'static str,
    pub cli_stem: &'static str,
    pub tx_stem: &'static str,
    pub app_cli_stem: &'static str,
    pub app_server_stem: &'static str,
    pub app_updater_stem: &'static str,
    /// Line the daemon prints on stdout once it begins serving
    pub startup_banner: &'static str,
    /// File the seed dump is written to when the user asks for it
    pub seed_file: &'static str,
    pub coin_release: ReleaseFiles,
    pub app_release: ReleaseFiles,
}

pub(super) const DIVI: CoinDescriptor = CoinDescriptor {
    coin_name: "Divi",
    coin_version: "1.08",
    app_name: "GoDivi",
    app_cli_name: "GoDivi CLI",
    app_server_name: "GoDivi Server",
    app_updater_name: "GoDivi Updater",
    home_dir: ".divi",
    home_dir_windows: "DIVI",
    bin_dir: "godivi",
    bin_dir_windows: "GoDivi",
    conf_file: "divi.conf",
    daemon_stem: "divid",
    cli_stem: "divi-cli",
    tx_stem: "divi-tx",
    app_cli_stem: "godivi",
    app_server_stem: "godivis",
    app_updater_stem: "update-godivi",
    startup_banner: "DIVI server starting",
    seed_file: "unsecure-divi-seed.txt",
    coin_release: ReleaseFiles {
        base_url: "https://github.com/DiviProject/Divi/releases/download/v1.0.8/",
        arm: "divi-1.0.8-RPi2.tar.gz",
        linux: "divi-1.0.8-x86_64-linux-gnu.tar.gz",
        windows: "divi-1.0.8-win64.zip",
    },
    app_release: ReleaseFiles {
        base_url: "https://bitbucket.org/rmace/godivi/downloads/",
        arm: "godivi-arm-latest.zip",
        linux: "godivi-linux-latest.zip",
        windows: "godivi-windows-latest.zip",
    },
};

pub(super) const PHORE: CoinDescriptor = CoinDescriptor {
    coin_name: "Phore",
    coin_version: "1.6.5",
    app_name: "BoxPhore",
    app_cli_name: "BoxPhore CLI",
    app_server_name: "BoxPhore Server",
    app_updater_name: "BoxPhore Updater",
    home_dir: ".phore",
    home_dir_windows: "PHORE",
    bin_dir: "boxphore",
    bin_dir_windows: "BoxPhore",
    conf_file: "phore.conf",
    daemon_stem: "phored",
    cli_stem: "phore-cli",
    tx_stem: "phore-tx",
    app_cli_stem: "boxphore",
    app_server_stem: "boxphores",
    app_updater_stem: "update-boxphore",
    startup_banner: "Phore server starting",
    seed_file: "unsecure-phore-seed.txt",
    coin_release: ReleaseFiles {
        base_url: "https://github.com/phoreproject/Phore/releases/download/v1.6.5/",
        arm: "phore-1.6.5-arm-linux-gnueabihf.tar.gz",
        linux: "phore-1.6.5-x86_64-linux-gnu.tar.gz",
        windows: "phore-1.6.5-win64.zip",
    },
    app_release: ReleaseFiles {
        base_url: "https://bitbucket.org/rmace/boxphore/downloads/",
        arm: "boxphore-arm-latest.zip",
        linux: "boxphore-linux-latest.zip",
        windows: "boxphore-windows-latest.zip",
    },
};

pub(super) const PIVX: CoinDescriptor = CoinDescriptor {
    coin_name: "PIVX",
    coin_version: "4.0.0",
    app_name: "GoPIVX",
    app_cli_name: "GoPIVX CLI",
    app_server_name: "GoPIVX Server",
    app_updater_name: "GoPIVX Updater",
    home_dir: ".pivx",
    home_dir_windows: "PIVX",
    bin_dir: "gopivx",
    bin_dir_windows: "GoPIVX",
    conf_file: "pivx.conf",
    daemon_stem: "pivxd",
    cli_stem: "pivx-cli",
    tx_stem: "pivx-tx",
    app_cli_stem: "gopivx",
    app_server_stem: "gopivxs",
    app_updater_stem: "update-gopivx",
    startup_banner: "PIVX server starting",
    seed_file: "unsecure-pivx-seed.txt",
    coin_release: ReleaseFiles {
        base_url: "https://github.com/PIVX-Project/PIVX/releases/download/v4.0.0/",
        arm: "pivx-4.0.0-arm-linux-gnueabihf.tar.gz",
        linux: "pivx-4.0.0-x86_64-linux-gnu.tar.gz",
        windows: "pivx-4.0.0-win64.zip",
    },
    app_release: ReleaseFiles {
        base_url: "https://bitbucket.org/rmace/gopivx/downloads/",
        arm: "gopivx-arm-latest.zip",
        linux: "gopivx-linux-latest.zip",
        windows: "gopivx-windows-latest.zip",
    },
};

pub(super) const TREZARCOIN: CoinDescriptor = CoinDescriptor {
    coin_name: "Trezarcoin",
    coin_version: "2.01",
    app_name: "GoTrezarcoin",
    app_cli_name: "GoTrezarcoin CLI",
    app_server_name: "GoTrezarcoin Server",
    app_updater_name: "GoTrezarcoin Updater",
    home_dir: ".trezarcoin",
    home_dir_windows: "TREZARCOIN",
    bin_dir: "gotrezarcoin",
    bin_dir_windows: "GoTrezarcoin",
    conf_file: "trezarcoin.conf",
    daemon_stem: "trezarcoind",
    cli_stem: "trezarcoin-cli",
    tx_stem: "trezarcoin-tx",
    app_cli_stem: "gotrezarcoin",
    app_server_stem: "gotrezarcoins",
    app_updater_stem: "update-gotrezarcoin",
    startup_banner: "Trezarcoin server starting",
    seed_file: "unsecure-trezarcoin-seed.txt",
    coin_release: ReleaseFiles {
        base_url: "https://github.com/TrezarCoin/TrezarCoin/releases/download/2.0.1.0/",
        arm: "trezarcoin-2.0.1-rPI.zip",
        linux: "trezarcoin-2.0.1-linux64.tar.gz",
        // Upstream only publishes an installer for Windows
        windows: "trezarcoin-2.0.1-win64-setup.exe",
    },
    app_release: ReleaseFiles {
        base_url: "https://bitbucket.org/rmace/gotrezarcoin/downloads/",
        arm: "gotrezarcoin-arm-latest.zip",
        linux: "gotrezarcoin-linux-latest.zip",
        windows: "gotrezarcoin-windows-latest.zip",
    },
};
