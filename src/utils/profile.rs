//! Shell profile helpers.
//!
//! Appends the wallet manager bin folder to the user's `PATH` via
//! `~/.profile`, once.

use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

const EXPORT_PATH_PREFIX: &str = "export PATH=$PATH:";

/// Line appended to the profile for a bin folder
pub fn export_path_line(bin_folder: &Path) -> String {
    format!("{}{}", EXPORT_PATH_PREFIX, bin_folder.display())
}

/// Add `bin_folder` to `PATH` in the given profile file.
///
/// Returns `Ok(true)` when the line was appended, `Ok(false)` when the profile
/// does not exist or already contains the line. A missing profile is left
/// alone rather than created.
pub fn add_bin_folder_to_profile(profile: &Path, bin_folder: &Path) -> io::Result<bool> {
    if !profile.exists() {
        debug!("Profile {:?} does not exist, not adding PATH entry", profile);
        return Ok(false);
    }

    let line = export_path_line(bin_folder);
    let content = fs::read_to_string(profile)?;
    if content.lines().any(|existing| existing.trim() == line) {
        return Ok(false);
    }

    let mut file = OpenOptions::new().append(true).open(profile)?;
    if !content.is_empty() && !content.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{}", line)?;
    info!("Added {:?} to PATH in {:?}", bin_folder, profile);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_once() {
        let dir = TempDir::new().unwrap();
        let profile = dir.path().join(".profile");
        fs::write(&profile, "umask 022").unwrap();
        let bin = Path::new("/home/alice/godivi");

        assert!(add_bin_folder_to_profile(&profile, bin).unwrap());
        assert!(!add_bin_folder_to_profile(&profile, bin).unwrap());

        let content = fs::read_to_string(&profile).unwrap();
        assert_eq!(content, "umask 022\nexport PATH=$PATH:/home/alice/godivi\n");
    }

    #[test]
    fn test_missing_profile_is_skipped() {
        let dir = TempDir::new().unwrap();
        let profile = dir.path().join(".profile");
        assert!(!add_bin_folder_to_profile(&profile, Path::new("/opt/godivi")).unwrap());
        assert!(!profile.exists());
    }
}
