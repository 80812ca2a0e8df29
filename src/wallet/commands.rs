use super::types::{BlockchainInfo, MnSyncStatus, StakingStatus, WalletInfo, WalletSecurityStatus};
use super::WalletError;
use crate::daemon::{DaemonController, LifecycleError, Sleeper};
use crate::process::{CommandRunner, ProcessTable};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const WAITING_FOR_WALLET: &str =
    "Waiting for wallet to respond. This could take several minutes...";

const INCORRECT_PASSPHRASE: &str = "passphrase entered was incorrect";
const ALREADY_UNLOCKED: &str = "wallet is already unlocked";

fn parse_output<D: DeserializeOwned>(command: &str, output: &str) -> Result<D, WalletError> {
    serde_json::from_str(output).map_err(|source| WalletError::Parse {
        command: command.to_string(),
        source,
    })
}

fn waiting_for_daemon<T, R, S>(controller: &DaemonController<T, R, S>) -> String
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    let paths = controller.paths();
    format!(
        "Waiting for {} server...",
        paths.coin.daemon_binary_name(paths.platform)
    )
}

/// Query `getblockchaininfo` once
pub fn get_blockchain_info<T, R, S>(
    controller: &DaemonController<T, R, S>,
) -> Result<BlockchainInfo, WalletError>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    let output = controller.run_cli_command("getblockchaininfo", WAITING_FOR_WALLET, 1)?;
    parse_output("getblockchaininfo", &output)
}

/// Start the daemon if needed, then query `getwalletinfo` until it answers
/// with JSON or the configured attempts run out
pub fn get_wallet_info<T, R, S>(
    controller: &DaemonController<T, R, S>,
) -> Result<WalletInfo, WalletError>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    controller.start(false)?;
    let attempts = controller.settings().cli_attempts;
    let info = controller.query_cli_json(
        &["getwalletinfo"],
        &waiting_for_daemon(controller),
        attempts,
    )?;
    Ok(info)
}

/// Query `mnsync status` once
pub fn get_mn_sync_status<T, R, S>(
    controller: &DaemonController<T, R, S>,
) -> Result<MnSyncStatus, WalletError>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    let output = controller.run_cli_command_with_value("mnsync", "status", WAITING_FOR_WALLET, 1)?;
    parse_output("mnsync", &output)
}

/// Query `getstakingstatus` once
pub fn get_staking_status<T, R, S>(
    controller: &DaemonController<T, R, S>,
) -> Result<StakingStatus, WalletError>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    let output = controller.run_cli_command("getstakingstatus", WAITING_FOR_WALLET, 1)?;
    parse_output("getstakingstatus", &output)
}

/// Receiving addresses of the default account (`getaddressesbyaccount ""`)
pub fn wallet_addresses<T, R, S>(
    controller: &DaemonController<T, R, S>,
) -> Result<Vec<String>, WalletError>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    controller.start(false)?;
    let attempts = controller.settings().cli_attempts;
    let output = controller.run_cli_command_with_value(
        "getaddressesbyaccount",
        "",
        WAITING_FOR_WALLET,
        attempts,
    )?;
    parse_output("getaddressesbyaccount", &output)
}

/// Raw `dumphdinfo` output, holding the wallet's recovery seed
pub fn dump_hd_info<T, R, S>(controller: &DaemonController<T, R, S>) -> Result<String, WalletError>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    controller.start(false)?;
    let attempts = controller.settings().cli_attempts;
    Ok(controller.run_cli_command("dumphdinfo", WAITING_FOR_WALLET, attempts)?)
}

/// Write seed material to `path`, readable by the owner only on Unix
pub fn save_seed_file(path: &Path, seed: &str) -> Result<(), WalletError> {
    let to_err = |source| WalletError::SeedFile {
        path: path.to_path_buf(),
        source,
    };
    fs::write(path, seed).map_err(to_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(to_err)?;
    }

    info!("Recovery seed written to {:?}", path);
    Ok(())
}

/// Unlock the wallet with `walletpassphrase <password> 0 [true]`.
///
/// Returns `Ok(false)` for a wrong passphrase and `Ok(true)` if the wallet
/// was already unlocked. With `for_staking` the wallet is unlocked for
/// staking only. An unencrypted wallet is reported as rejected.
pub fn unlock_wallet<T, R, S>(
    controller: &DaemonController<T, R, S>,
    password: &str,
    for_staking: bool,
) -> Result<bool, WalletError>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    let mut args = vec!["walletpassphrase", password, "0"];
    if for_staking {
        args.push("true");
    }

    let cli = controller.paths().cli_binary();
    let attempts = controller.settings().cli_attempts;
    match controller.run_command(&cli, &args, WAITING_FOR_WALLET, attempts) {
        Ok(_) => Ok(true),
        Err(err @ LifecycleError::CommandRejected { .. }) => {
            let output = err.output().unwrap_or_default().to_lowercase();
            if output.contains(INCORRECT_PASSPHRASE) {
                debug!("Wallet passphrase rejected");
                Ok(false)
            } else if output.contains(ALREADY_UNLOCKED) {
                debug!("Wallet was already unlocked");
                Ok(true)
            } else {
                Err(err.into())
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Lock the wallet with `walletlock`
pub fn lock_wallet<T, R, S>(controller: &DaemonController<T, R, S>) -> Result<(), WalletError>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    controller.run_cli_command("walletlock", WAITING_FOR_WALLET, 1)?;
    Ok(())
}

/// Encrypt the wallet with `encryptwallet <password>`, returning the daemon's reply.
///
/// The daemon shuts itself down after encrypting.
pub fn encrypt_wallet<T, R, S>(
    controller: &DaemonController<T, R, S>,
    password: &str,
) -> Result<String, WalletError>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    match controller.run_cli_command_with_value("encryptwallet", password, WAITING_FOR_WALLET, 1) {
        Ok(output) => Ok(output),
        Err(LifecycleError::CommandRejected { output, .. }) => {
            Err(WalletError::EncryptionFailed { output })
        }
        Err(e) => Err(e.into()),
    }
}

/// Current encryption state of the wallet
pub fn security_status<T, R, S>(
    controller: &DaemonController<T, R, S>,
) -> Result<WalletSecurityStatus, WalletError>
where
    T: ProcessTable,
    R: CommandRunner,
    S: Sleeper,
{
    let info = get_wallet_info(controller)?;
    Ok(WalletSecurityStatus::parse(&info.encryption_status))
}

/// Render a `verificationprogress` fraction as a percentage, e.g. `0.99994` -> `"99.99"`
pub fn format_verification_progress(progress: f64) -> String {
    format!("{:.2}", progress * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_verification_progress() {
        assert_eq!(format_verification_progress(0.99994), "99.99");
        assert_eq!(format_verification_progress(1.0), "100.00");
        assert_eq!(format_verification_progress(0.0), "0.00");
        assert_eq!(format_verification_progress(0.123456), "12.35");
    }

    #[test]
    fn test_parse_output_error_names_command() {
        let err = parse_output::<WalletInfo>("getwalletinfo", "Loading wallet...").unwrap_err();
        assert!(err.to_string().contains("getwalletinfo"));
    }

    #[test]
    fn test_save_seed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dwsf.txt");
        save_seed_file(&path, "{\"mnemonic\": \"abandon\"}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"mnemonic\": \"abandon\"}");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
