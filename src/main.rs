use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::{Path, PathBuf};

use walletkit::coin::{CoinIdentity, Platform};
use walletkit::config::{WalletConfig, CLI_CONFIG_FILE};
use walletkit::config_loader;
use walletkit::daemon::{DaemonController, StopTimeoutBehavior};
use walletkit::install;
use walletkit::process::{ProcessHandle, SystemCommandRunner, SystemProcessTable};
use walletkit::progress::TerminalProgress;
use walletkit::prompt::{Prompter, SeedRecoveryChoice, SEED_WARNING_TEXT};
use walletkit::utils::{add_bin_folder_to_profile, CoinPaths};
use walletkit::wallet;

type Controller = DaemonController<SystemProcessTable, SystemCommandRunner>;

/// Manage a coin daemon and its wallet from the command line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the wallet manager configuration file (YAML or JSON)
    #[arg(short, long, default_value = CLI_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default configuration file for a coin
    InitConfig {
        #[arg(long, value_enum)]
        coin: CoinIdentity,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Show whether the daemon and wallet manager processes are running
    Status,

    /// Start the coin daemon and wait for its startup banner
    Start {
        /// Only log failures
        #[arg(long)]
        quiet: bool,
    },

    /// Stop the coin daemon and wait for it to exit
    Stop {
        /// Report success even if the daemon is still running after the polling budget
        #[arg(long)]
        report_success_on_timeout: bool,
    },

    /// Run a coin CLI command, retrying while the daemon warms up
    Cli {
        /// RPC command, e.g. getinfo
        command: String,

        /// Optional single argument for the command
        value: Option<String>,

        /// Attempts before giving up (defaults to the configured budget)
        #[arg(long)]
        attempts: Option<u32>,
    },

    /// Show wallet, blockchain, masternode sync and staking status
    Info,

    /// Show the wallet's receiving addresses
    Address,

    /// Display the wallet's recovery seed, or save it to a file
    Seed {
        #[arg(long)]
        save: bool,
    },

    /// Unlock the wallet
    Unlock {
        /// Unlock for staking only
        #[arg(long)]
        staking: bool,
    },

    /// Lock the wallet
    Lock,

    /// Encrypt an unencrypted wallet
    Encrypt,

    /// Confirm that the recovery seed has been backed up
    ConfirmSeed,

    /// Download and install the coin binaries into the bin folder
    Install {
        /// Install from a local release archive instead of downloading
        #[arg(long)]
        archive: Option<PathBuf>,

        /// Do not add the bin folder to PATH in ~/.profile
        #[arg(long)]
        skip_profile: bool,
    },

    /// Install or update the wallet manager CLI, server and updater binaries
    Update {
        /// Install from a local app release archive instead of downloading
        #[arg(long)]
        archive: Option<PathBuf>,
    },

    /// Run the daemon once and write its RPC credentials to the coin conf file
    InitDaemon,

    /// Launch the wallet manager server in the background
    Server,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Command::InitConfig { coin, force } = &args.command {
        return init_config(&args.config, *coin, *force);
    }

    let config_path = config_loader::locate_config(&args.config);
    let mut config = config_loader::load_config(&config_path, false)?;
    info!("Managing {} ({})", config.app_name, config.project_type);

    match args.command {
        Command::InitConfig { .. } => unreachable!("handled above"),
        Command::Status => status(&build_controller(&config)?),
        Command::Start { quiet } => {
            build_controller(&config)?.start(!quiet)?;
            Ok(())
        }
        Command::Stop {
            report_success_on_timeout,
        } => {
            if report_success_on_timeout {
                config.lifecycle.stop_timeout_behavior = StopTimeoutBehavior::ReportSuccess;
            }
            build_controller(&config)?.stop()?;
            Ok(())
        }
        Command::Cli {
            command,
            value,
            attempts,
        } => {
            let controller = build_controller(&config)?;
            let attempts = attempts.unwrap_or(config.lifecycle.cli_attempts);
            let waiting = format!("Waiting for {} to respond", command);
            let output = match value {
                Some(value) => {
                    controller.run_cli_command_with_value(&command, &value, &waiting, attempts)?
                }
                None => controller.run_cli_command(&command, &waiting, attempts)?,
            };
            println!("{}", output.trim_end());
            Ok(())
        }
        Command::Info => show_info(&build_controller(&config)?),
        Command::Address => {
            let addresses = wallet::wallet_addresses(&build_controller(&config)?)?;
            for address in addresses {
                println!("{}", address);
            }
            Ok(())
        }
        Command::Seed { save } => seed(&build_controller(&config)?, save),
        Command::Unlock { staking } => {
            let controller = build_controller(&config)?;
            let password = Prompter::stdio().unlock_password()?;
            if !wallet::unlock_wallet(&controller, &password, staking)? {
                bail!("The wallet passphrase entered was incorrect");
            }
            println!("Wallet unlocked{}", if staking { " for staking" } else { "" });
            Ok(())
        }
        Command::Lock => {
            wallet::lock_wallet(&build_controller(&config)?)?;
            println!("Wallet locked");
            Ok(())
        }
        Command::Encrypt => encrypt(&build_controller(&config)?),
        Command::ConfirmSeed => confirm_seed(&config_path, &mut config),
        Command::Install {
            archive,
            skip_profile,
        } => install_binaries(&config, archive, skip_profile),
        Command::Update { archive } => {
            let paths = CoinPaths::for_current_user(config.project_type, Platform::current())?;
            let report = match archive {
                Some(archive) => install::install_app_from_archive(&paths, &archive)?,
                None => install::install_app(&paths)?,
            };
            for installed in &report.installed {
                println!("Installed {}", installed.display());
            }
            Ok(())
        }
        Command::InitDaemon => {
            let paths = CoinPaths::for_current_user(config.project_type, Platform::current())?;
            install::run_initial_daemon(&SystemCommandRunner::new(), &paths)?;
            println!("Wrote {:?}", paths.coin_conf_file());
            Ok(())
        }
        Command::Server => {
            build_controller(&config)?.run_app_server()?;
            Ok(())
        }
    }
}

fn init_config(path: &Path, coin: CoinIdentity, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{:?} already exists, pass --force to overwrite it", path);
    }
    config_loader::create_default_config(path, coin)?;
    println!("Wrote default {} configuration to {:?}", coin, path);
    Ok(())
}

fn build_controller(config: &WalletConfig) -> Result<Controller> {
    let paths = CoinPaths::for_current_user(config.project_type, Platform::current())?;
    if !paths.is_installed() {
        warn!(
            "{:?} does not exist, run `install` first",
            paths.apps_bin_folder()
        );
    }
    let lock_file = paths.lifecycle_lock_file();

    Ok(DaemonController::new(
        paths,
        config.lifecycle.clone(),
        SystemProcessTable::new(),
        SystemCommandRunner::new(),
    )
    .with_lock_file(lock_file)
    .with_progress(Box::new(TerminalProgress::stderr())))
}

fn describe(found: Option<ProcessHandle>) -> String {
    match found {
        Some(handle) => format!("running (pid {})", handle.pid),
        None => "not running".to_string(),
    }
}

fn status(controller: &Controller) -> Result<()> {
    let paths = controller.paths();
    println!(
        "{}: {}",
        paths.coin.daemon_binary_name(paths.platform),
        describe(controller.is_running()?)
    );
    println!(
        "{}: {}",
        paths.coin.app_cli_binary_name(paths.platform),
        describe(controller.is_app_cli_running()?)
    );
    println!(
        "{}: {}",
        paths.coin.app_server_binary_name(paths.platform),
        describe(controller.is_app_server_running()?)
    );
    Ok(())
}

fn show_info(controller: &Controller) -> Result<()> {
    let wallet_info = wallet::get_wallet_info(controller)?;
    let chain = wallet::get_blockchain_info(controller)?;

    println!("Balance:      {}", wallet_info.balance);
    println!(
        "Wallet:       {}",
        wallet::WalletSecurityStatus::parse(&wallet_info.encryption_status)
    );
    println!(
        "Blockchain:   {} blocks, {}% verified",
        chain.blocks,
        wallet::format_verification_progress(chain.verificationprogress)
    );

    // Not every coin supports these
    match wallet::get_mn_sync_status(controller) {
        Ok(sync) => println!(
            "Masternodes:  {}",
            if sync.is_blockchain_synced { "synced" } else { "syncing" }
        ),
        Err(e) => warn!("Masternode sync status unavailable: {}", e),
    }
    match wallet::get_staking_status(controller) {
        Ok(staking) => println!(
            "Staking:      {}",
            if staking.staking_status { "active" } else { "inactive" }
        ),
        Err(e) => warn!("Staking status unavailable: {}", e),
    }
    Ok(())
}

fn seed(controller: &Controller, save: bool) -> Result<()> {
    let mut prompter = Prompter::stdio();
    println!("\n{}\n", SEED_WARNING_TEXT);

    if save {
        let question = "Storing your recovery seed in a file is risky.\n\nPlease confirm that you understand the risks:";
        if !prompter.yes_no(question)? {
            return Ok(());
        }
    }

    println!("\nRequesting recovery seed...");
    let seed = wallet::dump_hd_info(controller)?;

    if save {
        let path = controller.paths().seed_file();
        wallet::save_seed_file(&path, &seed)?;
        println!(
            "Please store the seed file somewhere safe. The file has been saved to: {}",
            path.display()
        );
    } else {
        println!("\n{}", seed.trim_end());
    }
    Ok(())
}

fn encrypt(controller: &Controller) -> Result<()> {
    let status = wallet::security_status(controller)?;
    if status.is_encrypted() {
        println!("Wallet is already encrypted ({})", status);
        return Ok(());
    }

    let mut prompter = Prompter::stdio();
    if !prompter.encrypt_wallet_now()? {
        return Ok(());
    }
    let password = prompter
        .new_wallet_password()?
        .ok_or_else(|| eyre!("Passwords did not match, wallet left unencrypted"))?;

    let reply = wallet::encrypt_wallet(controller, &password)?;
    println!("{}", reply.trim_end());
    Ok(())
}

fn confirm_seed(config_path: &Path, config: &mut WalletConfig) -> Result<()> {
    if config.user_confirmed_seed_recovery {
        println!("Recovery seed backup already confirmed");
        return Ok(());
    }

    let controller = build_controller(config)?;
    let mut prompter = Prompter::stdio();
    loop {
        match prompter.seed_recovery_choice()? {
            SeedRecoveryChoice::Display => {
                println!("\n{}\n", SEED_WARNING_TEXT);
                let seed = wallet::dump_hd_info(&controller)?;
                println!("{}", seed.trim_end());
            }
            SeedRecoveryChoice::Confirm => {
                if prompter.confirm_seed_stored()? {
                    config.user_confirmed_seed_recovery = true;
                    config_loader::save_config(config_path, config)?;
                    println!("Thank you, recovery seed backup confirmed");
                    return Ok(());
                }
                println!("Response not recognised");
            }
            SeedRecoveryChoice::MoveOn => return Ok(()),
            SeedRecoveryChoice::Other(answer) => println!("Unknown option {:?}", answer),
        }
    }
}

fn install_binaries(config: &WalletConfig, archive: Option<PathBuf>, skip_profile: bool) -> Result<()> {
    let paths = CoinPaths::for_current_user(config.project_type, Platform::current())?;

    let report = match archive {
        Some(archive) => install::install_from_archive(&paths, &archive)?,
        None => install::install_coin(&paths)?,
    };
    for installed in &report.installed {
        println!("Installed {}", installed.display());
    }

    let app = install::install_self(&paths)?;
    println!("Installed {}", app.display());

    if cfg!(unix) && !skip_profile {
        let profile = paths.home().join(".profile");
        add_bin_folder_to_profile(&profile, &paths.apps_bin_folder())
            .wrap_err_with(|| format!("Failed to update {:?}", profile))?;
    }
    Ok(())
}
