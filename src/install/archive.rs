use super::InstallError;
use flate2::read::GzDecoder;
use log::debug;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tar::Archive;
use zip::ZipArchive;

/// Release archive formats the installer can unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Pick the format from a release file name
    pub fn from_file_name(file_name: &str) -> Result<Self, InstallError> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Ok(ArchiveKind::Zip)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Ok(ArchiveKind::TarGz)
        } else {
            Err(InstallError::UnsupportedArchive(file_name.to_string()))
        }
    }
}

/// Unpack `archive_path` into `dest_dir`
pub fn extract_archive(archive_path: &Path, kind: ArchiveKind, dest_dir: &Path) -> Result<(), InstallError> {
    debug!("Extracting {:?} ({:?}) into {:?}", archive_path, kind, dest_dir);
    fs::create_dir_all(dest_dir).map_err(InstallError::io(dest_dir))?;
    match kind {
        ArchiveKind::Zip => extract_zip(archive_path, dest_dir),
        ArchiveKind::TarGz => extract_tar_gz(archive_path, dest_dir),
    }
}

fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<(), InstallError> {
    let file = File::open(archive_path).map_err(InstallError::io(archive_path))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.unpack(dest_dir).map_err(InstallError::io(archive_path))
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<(), InstallError> {
    let zip_err = |source| InstallError::Zip {
        path: archive_path.to_path_buf(),
        source,
    };
    let file = File::open(archive_path).map_err(InstallError::io(archive_path))?;
    let mut archive = ZipArchive::new(file).map_err(zip_err)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(zip_err)?;

        // Entries escaping the destination are skipped
        let Some(relative) = entry.enclosed_name().map(|p| p.to_owned()) else {
            continue;
        };

        let out_path = dest_dir.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(InstallError::io(&out_path))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(InstallError::io(parent))?;
        }

        let mut out_file = File::create(&out_path).map_err(InstallError::io(&out_path))?;
        io::copy(&mut entry, &mut out_file).map_err(InstallError::io(&out_path))?;
    }

    Ok(())
}

/// Depth-first search under `root` for a file called exactly `name`
pub fn find_file(root: &Path, name: &str) -> Result<Option<PathBuf>, InstallError> {
    let mut entries: Vec<_> = fs::read_dir(root)
        .map_err(InstallError::io(root))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(InstallError::io(root))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(InstallError::io(&path))?;
        if file_type.is_dir() {
            if let Some(found) = find_file(&path, name)? {
                return Ok(Some(found));
            }
        } else if entry.file_name() == name {
            return Ok(Some(path));
        }
    }
    Ok(None)
}
