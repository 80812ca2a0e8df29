use crate::coin::CoinIdentity;
use crate::config::{WalletConfig, CLI_CONFIG_FILE, SERVER_CONFIG_FILE};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Serialization format of a config file, picked from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// `.json` files are JSON; everything else (`.yaml`, `.yml`, no extension) is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Parse configuration text in the given format
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<WalletConfig> {
    let config: WalletConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Render a configuration in the given format
pub fn render_config(config: &WalletConfig, format: ConfigFormat) -> Result<String> {
    let rendered = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(rendered)
}

/// Resolve the config file to load.
///
/// A missing `cli.yaml` falls back to a `server-config.json` in the same
/// folder, the file the server front-end keeps.
pub fn locate_config(requested: &Path) -> PathBuf {
    if requested.exists() || requested.file_name() != Some(OsStr::new(CLI_CONFIG_FILE)) {
        return requested.to_path_buf();
    }

    let fallback = requested.with_file_name(SERVER_CONFIG_FILE);
    if fallback.exists() {
        info!("{:?} not found, using {:?}", requested, fallback);
        fallback
    } else {
        requested.to_path_buf()
    }
}

/// Load and validate configuration from a JSON or YAML file.
///
/// When `refresh_fields` is set the file is written back after loading, so
/// fields added since it was created appear with their defaults.
pub fn load_config(config_path: &Path, refresh_fields: bool) -> Result<WalletConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let content = fs::read_to_string(config_path)
        .wrap_err_with(|| format!("Failed to read config file {:?}", config_path))?;

    let format = ConfigFormat::from_path(config_path);
    let config = parse_config(&content, format)
        .wrap_err_with(|| format!("Failed to parse config file {:?}", config_path))?;

    config.validate()?;
    debug!("Configuration selects coin {}", config.project_type);

    if refresh_fields {
        save_config(config_path, &config)?;
    }

    Ok(config)
}

/// Save configuration, picking JSON or YAML from the file extension
pub fn save_config(config_path: &Path, config: &WalletConfig) -> Result<()> {
    let rendered = render_config(config, ConfigFormat::from_path(config_path))?;

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create config directory {:?}", parent))?;
        }
    }

    fs::write(config_path, rendered)
        .wrap_err_with(|| format!("Failed to write config file {:?}", config_path))?;
    Ok(())
}

/// Write a default configuration for `coin` and return it
pub fn create_default_config(config_path: &Path, coin: CoinIdentity) -> Result<WalletConfig> {
    let config = WalletConfig::new_for(coin);
    info!("Creating default config file {:?}", config_path);
    save_config(config_path, &config)?;
    Ok(config)
}

/// Read only the coin identity, the one field the lifecycle controller needs
pub fn load_coin_identity(config_path: &Path) -> Result<CoinIdentity> {
    Ok(load_config(config_path, false)?.project_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("server-config.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("cli.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("cli.YML")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("cli")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_load_yaml_config() {
        let yaml = r#"
app_name: GoTrezarcoin
project_type: trezarcoin
server_ip: 127.0.0.1
port: 4000
user_confirmed_seed_recovery: true
"#;

        let mut temp_file = Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path(), false).unwrap();
        assert_eq!(config.project_type, CoinIdentity::Trezarcoin);
        assert!(config.user_confirmed_seed_recovery);
    }

    #[test]
    fn test_load_json_config() {
        let json = r#"{
  "app_name": "GoDivi",
  "project_type": "divi",
  "server_ip": "127.0.0.1",
  "port": 4000
}"#;

        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(temp_file, "{}", json).unwrap();

        assert_eq!(load_coin_identity(temp_file.path()).unwrap(), CoinIdentity::Divi);
    }

    #[test]
    fn test_refresh_writes_new_fields_back() {
        let json = r#"{"app_name":"GoDivi","project_type":"divi","server_ip":"127.0.0.1","port":4000}"#;
        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(temp_file, "{}", json).unwrap();

        load_config(temp_file.path(), true).unwrap();

        let refreshed = fs::read_to_string(temp_file.path()).unwrap();
        assert!(refreshed.contains("user_confirmed_seed_recovery"));
        assert!(refreshed.contains("stop_max_polls"));
    }

    #[test]
    fn test_create_default_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cli.yaml");

        let created = create_default_config(&path, CoinIdentity::Pivx).unwrap();
        let loaded = load_config(&path, false).unwrap();
        assert_eq!(created, loaded);
        assert_eq!(loaded.app_name, "GoPIVX");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let yaml = "app_name: GoDivi\nproject_type: divi\nserver_ip: not-an-ip\nport: 4000\n";
        let mut temp_file = Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        assert!(load_config(temp_file.path(), false).is_err());
    }

    #[test]
    fn test_missing_cli_config_falls_back_to_server_config() {
        let dir = TempDir::new().unwrap();
        let requested = dir.path().join(CLI_CONFIG_FILE);
        assert_eq!(locate_config(&requested), requested);

        let server = dir.path().join(SERVER_CONFIG_FILE);
        fs::write(
            &server,
            r#"{"AppName":"GoDivi","ProjectType":0,"ServerIP":"127.0.0.1","Port":"4000","UserConfirmedSeedRecovery":false}"#,
        )
        .unwrap();

        let located = locate_config(&requested);
        assert_eq!(located, server);
        assert_eq!(load_coin_identity(&located).unwrap(), CoinIdentity::Divi);

        // An explicitly named file is never swapped
        let other = dir.path().join("other.yaml");
        assert_eq!(locate_config(&other), other);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let err = load_config(&dir.path().join("cli.yaml"), false).unwrap_err();
        assert!(format!("{:?}", err).contains("cli.yaml"));
    }
}
