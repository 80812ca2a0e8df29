//! First-run daemon configuration.
//!
//! A coin daemon started without a config file prints suggested
//! `rpcuser=` / `rpcpassword=` lines and exits. We run it once, pick those
//! lines out of its output and write them into the coin's conf file.

use super::InstallError;
use crate::process::CommandRunner;
use crate::utils::binary::{validate_binary, CoinPaths};
use log::info;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

/// RPC credentials for the coin daemon's conf file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcCredentials {
    pub user: String,
    pub password: String,
}

static CREDENTIAL_PATTERN: LazyLock<Regex> = LazyLock::new(||
    Regex::new(r"(?m)^\s*(rpcuser|rpcpassword)=(\S+)\s*$").expect("Invalid credential regex")
);

/// Extract the suggested `rpcuser=` and `rpcpassword=` values from daemon output.
///
/// The last suggestion of each wins. Returns `None` unless both are present.
pub fn parse_rpc_credentials(output: &str) -> Option<RpcCredentials> {
    let mut user = None;
    let mut password = None;

    for captures in CREDENTIAL_PATTERN.captures_iter(output) {
        let value = captures[2].to_string();
        match &captures[1] {
            "rpcuser" => user = Some(value),
            _ => password = Some(value),
        }
    }

    Some(RpcCredentials {
        user: user?,
        password: password?,
    })
}

/// Append the credentials and `daemon=1` to the conf file at `conf_path`
pub fn write_coin_conf(conf_path: &Path, credentials: &RpcCredentials) -> Result<(), InstallError> {
    if let Some(parent) = conf_path.parent() {
        fs::create_dir_all(parent).map_err(InstallError::io(parent))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(conf_path)
        .map_err(InstallError::io(conf_path))?;

    write!(
        file,
        "rpcuser={}\nrpcpassword={}\n\ndaemon=1\n\n",
        credentials.user, credentials.password
    )
    .map_err(InstallError::io(conf_path))?;
    Ok(())
}

/// Run the daemon once and write the coin conf file from its suggestions.
///
/// The daemon exits with an error status on this first run, so only the
/// presence of the credentials in its output decides success.
pub fn run_initial_daemon<R: CommandRunner + ?Sized>(
    runner: &R,
    paths: &CoinPaths,
) -> Result<RpcCredentials, InstallError> {
    let daemon = paths.daemon_binary();
    validate_binary(&daemon)?;

    info!("Running {:?} for the first time...", daemon);
    let result = runner.run(&daemon, &[]).map_err(InstallError::io(&daemon))?;

    let credentials =
        parse_rpc_credentials(&result.output).ok_or(InstallError::MissingRpcCredentials)?;

    let conf_path = paths.coin_conf_file();
    info!("Populating {:?} for initial setup...", conf_path);
    write_coin_conf(&conf_path, &credentials)?;
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIRST_RUN_OUTPUT: &str = "\
Error: To use divid, or the -server option to divi-qt, you must set an rpcpassword in the configuration file:
/home/alice/.divi/divi.conf
It is recommended you use the following random password:
rpcuser=divirpc
rpcpassword=8mNPv3wyGvQ2ZsTbR7Ck
(you do not need to remember this password)
";

    #[test]
    fn test_parse_rpc_credentials() {
        let credentials = parse_rpc_credentials(FIRST_RUN_OUTPUT).unwrap();
        assert_eq!(credentials.user, "divirpc");
        assert_eq!(credentials.password, "8mNPv3wyGvQ2ZsTbR7Ck");
    }

    #[test]
    fn test_parse_requires_both_values() {
        assert!(parse_rpc_credentials("rpcuser=divirpc\n").is_none());
        assert!(parse_rpc_credentials("you must set an rpcpassword in the configuration file").is_none());
    }

    #[test]
    fn test_write_coin_conf_layout() {
        let dir = TempDir::new().unwrap();
        let conf = dir.path().join(".divi").join("divi.conf");
        let credentials = RpcCredentials {
            user: "divirpc".to_string(),
            password: "secret".to_string(),
        };

        write_coin_conf(&conf, &credentials).unwrap();
        assert_eq!(
            fs::read_to_string(&conf).unwrap(),
            "rpcuser=divirpc\nrpcpassword=secret\n\ndaemon=1\n\n"
        );
    }
}
