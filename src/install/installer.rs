use super::archive::{extract_archive, find_file, ArchiveKind};
use super::download::{create_client, download_file};
use super::InstallError;
use crate::coin::DownloadLink;
use crate::utils::binary::CoinPaths;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Files placed into the bin folder by an install
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub installed: Vec<PathBuf>,
}

/// Download `link` into a scratch folder that lives as long as the returned `TempDir`
fn download_release(link: &DownloadLink) -> Result<(TempDir, PathBuf), InstallError> {
    ArchiveKind::from_file_name(&link.file_name)?;

    let scratch = TempDir::new().map_err(InstallError::io(std::env::temp_dir()))?;
    let archive_path = scratch.path().join(&link.file_name);

    let client = create_client()?;
    download_file(&client, &link.url(), &archive_path)?;
    Ok((scratch, archive_path))
}

/// Download the coin release for `paths.platform` and install its binaries.
///
/// The archive is downloaded into a temporary folder that is removed
/// afterwards, whether or not the install succeeds.
pub fn install_coin(paths: &CoinPaths) -> Result<InstallReport, InstallError> {
    let (_scratch, archive_path) = download_release(&paths.coin.coin_download_link(paths.platform))?;
    install_from_archive(paths, &archive_path)
}

/// Install the daemon, CLI and tx binaries found in a local release archive
pub fn install_from_archive(paths: &CoinPaths, archive_path: &Path) -> Result<InstallReport, InstallError> {
    let coin = paths.coin;
    let wanted = [
        (coin.daemon_binary_name(paths.platform), "daemon"),
        (coin.cli_binary_name(paths.platform), "CLI"),
        (coin.tx_binary_name(paths.platform), "tx tool"),
    ];

    let report = install_binaries(paths, archive_path, &wanted)?;
    info!(
        "Installed {} {} binaries into {:?}",
        coin,
        coin.coin_version(),
        paths.apps_bin_folder()
    );
    Ok(report)
}

/// Download the latest wallet manager release and install or update its
/// CLI, server and updater binaries
pub fn install_app(paths: &CoinPaths) -> Result<InstallReport, InstallError> {
    let (_scratch, archive_path) = download_release(&paths.coin.app_download_link(paths.platform))?;
    install_app_from_archive(paths, &archive_path)
}

/// Install the wallet manager binaries found in a local app release archive
pub fn install_app_from_archive(
    paths: &CoinPaths,
    archive_path: &Path,
) -> Result<InstallReport, InstallError> {
    let coin = paths.coin;
    let descriptor = coin.descriptor();
    let wanted = [
        (coin.app_cli_binary_name(paths.platform), descriptor.app_cli_name),
        (coin.app_server_binary_name(paths.platform), descriptor.app_server_name),
        (coin.app_updater_binary_name(paths.platform), descriptor.app_updater_name),
    ];
    install_binaries(paths, archive_path, &wanted)
}

/// Extract `archive_path` and copy each `(file name, label)` in `wanted` into the bin folder
fn install_binaries(
    paths: &CoinPaths,
    archive_path: &Path,
    wanted: &[(String, &str)],
) -> Result<InstallReport, InstallError> {
    let file_name = archive_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let kind = ArchiveKind::from_file_name(file_name)?;

    let extracted = TempDir::new().map_err(InstallError::io(std::env::temp_dir()))?;
    extract_archive(archive_path, kind, extracted.path())?;

    let bin_folder = paths.apps_bin_folder();
    fs::create_dir_all(&bin_folder).map_err(InstallError::io(&bin_folder))?;

    let mut report = InstallReport::default();
    for (name, label) in wanted {
        let source = find_file(extracted.path(), name)?.ok_or_else(|| InstallError::MissingBinary {
            name: name.clone(),
            root: archive_path.to_path_buf(),
        })?;
        let target = bin_folder.join(name);
        copy_executable(&source, &target)?;
        debug!("Installed {} as {:?}", label, target);
        report.installed.push(target);
    }
    Ok(report)
}

/// Copy the running executable into the bin folder under the app CLI name
pub fn install_self(paths: &CoinPaths) -> Result<PathBuf, InstallError> {
    let current = std::env::current_exe().map_err(InstallError::io("current executable"))?;
    let bin_folder = paths.apps_bin_folder();
    fs::create_dir_all(&bin_folder).map_err(InstallError::io(&bin_folder))?;

    let target = bin_folder.join(paths.coin.app_cli_binary_name(paths.platform));
    if current == target {
        debug!("{:?} is already installed", target);
        return Ok(target);
    }
    copy_executable(&current, &target)?;
    Ok(target)
}

fn copy_executable(source: &Path, target: &Path) -> Result<(), InstallError> {
    debug!("Copying {:?} to {:?}", source, target);
    // Unlink first so a running binary can be replaced
    if target.exists() {
        fs::remove_file(target).map_err(InstallError::io(target))?;
    }
    fs::copy(source, target).map_err(InstallError::io(target))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(target, fs::Permissions::from_mode(0o755))
            .map_err(InstallError::io(target))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::{CoinIdentity, Platform};
    use crate::utils::binary::validate_binary;
    use std::fs::File;

    fn write_release(path: &Path, root: &str, names: &[&str]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for name in names {
            let data = format!("#!/bin/sh\necho {}\n", name);
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, format!("{}/bin/{}", root, name), data.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_install_from_archive() {
        let home = TempDir::new().unwrap();
        let paths = CoinPaths::new(CoinIdentity::Divi, Platform::Linux, home.path());
        let archive = home.path().join("divi-1.0.8-x86_64-linux-gnu.tar.gz");
        write_release(&archive, "divi-1.0.8", &["divid", "divi-cli", "divi-tx", "divi-qt"]);

        let report = install_from_archive(&paths, &archive).unwrap();
        assert_eq!(report.installed.len(), 3);
        assert!(paths.is_installed());
        assert!(validate_binary(&paths.daemon_binary()).is_ok());
        assert!(validate_binary(&paths.cli_binary()).is_ok());
        assert!(!paths.apps_bin_folder().join("divi-qt").exists());
    }

    #[test]
    fn test_missing_binary_in_archive() {
        let home = TempDir::new().unwrap();
        let paths = CoinPaths::new(CoinIdentity::Divi, Platform::Linux, home.path());
        let archive = home.path().join("divi.tar.gz");
        write_release(&archive, "divi-1.0.8", &["divid"]);

        let err = install_from_archive(&paths, &archive).unwrap_err();
        assert!(matches!(err, InstallError::MissingBinary { ref name, .. } if name == "divi-cli"));
    }

    fn write_app_release(path: &Path, names: &[&str]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        for name in names {
            zip.start_file(format!("godivi-linux/{}", name), options).unwrap();
            std::io::Write::write_all(&mut zip, format!("#!/bin/sh\necho {}\n", name).as_bytes())
                .unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_install_app_from_archive_replaces_existing() {
        let home = TempDir::new().unwrap();
        let paths = CoinPaths::new(CoinIdentity::Divi, Platform::Linux, home.path());
        let archive = home.path().join("godivi-linux-latest.zip");
        write_app_release(&archive, &["godivi", "godivis", "update-godivi"]);

        // An older app CLI is already installed
        fs::create_dir_all(paths.apps_bin_folder()).unwrap();
        let old_cli = paths.apps_bin_folder().join("godivi");
        fs::write(&old_cli, "old").unwrap();

        let report = install_app_from_archive(&paths, &archive).unwrap();
        assert_eq!(
            report.installed,
            vec![
                paths.apps_bin_folder().join("godivi"),
                paths.app_server_binary(),
                paths.apps_bin_folder().join("update-godivi"),
            ]
        );
        assert_eq!(fs::read_to_string(&old_cli).unwrap(), "#!/bin/sh\necho godivi\n");
        for installed in &report.installed {
            assert!(validate_binary(installed).is_ok());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(paths.app_server_binary()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_app_archive_without_updater_fails() {
        let home = TempDir::new().unwrap();
        let paths = CoinPaths::new(CoinIdentity::Divi, Platform::Linux, home.path());
        let archive = home.path().join("godivi-linux-latest.zip");
        write_app_release(&archive, &["godivi", "godivis"]);

        let err = install_app_from_archive(&paths, &archive).unwrap_err();
        assert!(matches!(err, InstallError::MissingBinary { ref name, .. } if name == "update-godivi"));
    }

    #[test]
    fn test_setup_executable_is_unsupported() {
        let home = TempDir::new().unwrap();
        let paths = CoinPaths::new(CoinIdentity::Trezarcoin, Platform::Windows, home.path());
        assert!(matches!(
            install_coin(&paths),
            Err(InstallError::UnsupportedArchive(_))
        ));
        assert!(!paths.is_installed());
    }
}
