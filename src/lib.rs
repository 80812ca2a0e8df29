//! # Walletkit - Shared toolkit for coin wallet managers
//!
//! This library provides the pieces a wallet manager front-end (CLI or
//! server) needs to drive a locally installed coin daemon and its
//! command-line client.
//!
//! ## Overview
//!
//! The wallet manager installs a coin's release binaries into a per-user bin
//! folder, starts the coin daemon, talks to it through the coin CLI, and
//! stops it again. The same code serves several coins (Divi, Phore, PIVX,
//! Trezarcoin) that differ only in names, folders, banners and download
//! links.
//!
//! ## Key Features
//!
//! - **Daemon Lifecycle**: Idempotent start/stop with startup banner detection
//!   and bounded stop polling
//! - **Retrying CLI Calls**: Fixed attempt budget while the daemon warms up,
//!   immediate failure for requests the daemon rejects
//! - **Coin Table**: One descriptor per coin instead of per-coin branches
//! - **Installs**: Release download and extraction of `.zip` and `.tar.gz`
//! - **Prompts**: Password, seed backup and confirmation dialogs
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `coin`: Coin identities, platform detection and the descriptor table
//! - `config`: Wallet manager configuration structures and validation
//! - `config_loader`: Configuration file loading and saving (YAML or JSON)
//! - `daemon`: Lifecycle controller, state machine, retry and locking
//! - `process`: Process table and child process access behind traits
//! - `wallet`: Typed wallet queries over the coin CLI
//! - `install`: Release download, extraction and first-run daemon setup
//! - `prompt`: Interactive terminal prompts
//! - `progress`: Terminal progress indicator
//! - `utils`: Install paths, binary validation and profile helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use walletkit::coin::{CoinIdentity, Platform};
//! use walletkit::config::LifecycleSettings;
//! use walletkit::daemon::DaemonController;
//! use walletkit::process::{SystemCommandRunner, SystemProcessTable};
//! use walletkit::utils::CoinPaths;
//!
//! let paths = CoinPaths::for_current_user(CoinIdentity::Divi, Platform::current())?;
//! let controller = DaemonController::new(
//!     paths,
//!     LifecycleSettings::default(),
//!     SystemProcessTable::new(),
//!     SystemCommandRunner::new(),
//! );
//!
//! controller.start(true)?;
//! let info = controller.run_cli_command("getinfo", "Waiting for divid", 30)?;
//! println!("{}", info);
//! controller.stop()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library modules return typed `thiserror` errors (`LifecycleError`,
//! `WalletError`, `InstallError`, ...). Configuration loading and the
//! `walletkit` binary use `color_eyre` for reports with context.

pub mod coin;
pub mod config;
pub mod config_loader;
pub mod daemon;
pub mod install;
pub mod process;
pub mod progress;
pub mod prompt;
pub mod utils;
pub mod wallet;
