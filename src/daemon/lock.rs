//! Cross-process serialization of daemon start and stop.
//!
//! On Unix an exclusive `flock` is taken on a lock file in the coin's bin
//! folder for the duration of a start or stop, so two wallet manager
//! processes cannot launch the daemon twice. Elsewhere only the in-process
//! mutex held by the controller applies.

use super::error::LifecycleError;
use log::debug;
use std::path::Path;

/// Held for the duration of a start or stop; released on drop
pub struct LifecycleLock {
    #[cfg(unix)]
    _flock: Option<nix::fcntl::Flock<std::fs::File>>,
}

impl LifecycleLock {
    fn unlocked() -> Self {
        Self {
            #[cfg(unix)]
            _flock: None,
        }
    }

    /// Block until the lock at `path` is held.
    ///
    /// No file lock is taken when `path` is `None` or its folder does not
    /// exist yet; the lock file is never what creates the bin folder.
    pub fn acquire(path: Option<&Path>) -> Result<Self, LifecycleError> {
        let Some(path) = path else {
            return Ok(Self::unlocked());
        };

        if !path.parent().map_or(false, Path::is_dir) {
            debug!("Skipping lifecycle lock, {:?} has no folder yet", path);
            return Ok(Self::unlocked());
        }

        Self::acquire_file(path)
    }

    #[cfg(unix)]
    fn acquire_file(path: &Path) -> Result<Self, LifecycleError> {
        use nix::fcntl::{Flock, FlockArg};
        use std::fs::OpenOptions;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|source| LifecycleError::LockFailed {
                path: path.to_path_buf(),
                source,
            })?;

        let flock = Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| {
            LifecycleError::LockFailed {
                path: path.to_path_buf(),
                source: errno.into(),
            }
        })?;

        debug!("Acquired lifecycle lock {:?}", path);
        Ok(Self {
            _flock: Some(flock),
        })
    }

    #[cfg(not(unix))]
    fn acquire_file(path: &Path) -> Result<Self, LifecycleError> {
        debug!("File locking unavailable, not locking {:?}", path);
        Ok(Self::unlocked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_path_is_noop() {
        assert!(LifecycleLock::acquire(None).is_ok());
    }

    #[test]
    fn test_missing_folder_is_not_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("godivi").join(".divi-lifecycle.lock");
        LifecycleLock::acquire(Some(&path)).unwrap();
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn test_lock_can_be_reacquired_after_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".divi-lifecycle.lock");

        let first = LifecycleLock::acquire(Some(&path)).unwrap();
        drop(first);
        let _second = LifecycleLock::acquire(Some(&path)).unwrap();
        #[cfg(unix)]
        assert!(path.exists());
    }
}
