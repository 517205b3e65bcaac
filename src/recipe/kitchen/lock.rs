// src/recipe/kitchen/lock.rs

//! Exclusive lock on a build folder
//!
//! Two cooks of the same build configuration write the same build and
//! generator folder. The Kitchen holds this lock from generate through
//! package so such cooks run one after the other. Cooks of different
//! configurations use different folders and never contend.

use crate::error::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the lock file inside the build folder
pub const LOCK_FILE: &str = ".simmer.lock";

/// Exclusive `flock` on `<build_folder>/.simmer.lock`, released on drop
pub struct BuildFolderLock {
    /// Kept open to hold the lock
    #[allow(dead_code)]
    file: File,
    path: PathBuf,
}

impl BuildFolderLock {
    /// Acquire the lock, blocking until it is available
    pub fn acquire(build_dir: &Path) -> Result<Self> {
        let (file, path) = Self::open(build_dir)?;

        file.lock_exclusive()
            .map_err(|e| Error::Lock(format!("{}: {}", path.display(), e)))?;

        info!("Locked build folder {}", build_dir.display());
        Ok(Self { file, path })
    }

    /// Try to acquire the lock without blocking
    ///
    /// Returns `Ok(None)` if another cook holds it.
    pub fn try_acquire(build_dir: &Path) -> Result<Option<Self>> {
        let (file, path) = Self::open(build_dir)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                info!("Locked build folder {}", build_dir.display());
                Ok(Some(Self { file, path }))
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                debug!("Build folder {} is locked by another cook", build_dir.display());
                Ok(None)
            }
            Err(e) => Err(Error::Lock(format!("{}: {}", path.display(), e))),
        }
    }

    /// Path to the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(build_dir: &Path) -> Result<(File, PathBuf)> {
        fs::create_dir_all(build_dir)
            .map_err(|e| Error::Lock(format!("{}: {}", build_dir.display(), e)))?;

        let path = build_dir.join(LOCK_FILE);
        let file = File::create(&path)
            .map_err(|e| Error::Lock(format!("{}: {}", path.display(), e)))?;

        Ok((file, path))
    }
}

impl Drop for BuildFolderLock {
    fn drop(&mut self) {
        // Lock is released when the file is closed
        debug!("Released build folder lock {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_creates_lock_file() {
        let temp = TempDir::new().unwrap();
        let build_dir = temp.path().join("build/Release");

        let lock = BuildFolderLock::acquire(&build_dir).unwrap();
        assert_eq!(lock.path(), build_dir.join(LOCK_FILE));
        assert!(lock.path().exists());
    }

    #[test]
    fn test_second_lock_is_contended() {
        let temp = TempDir::new().unwrap();
        let build_dir = temp.path().join("build/Release");

        let held = BuildFolderLock::acquire(&build_dir).unwrap();
        assert!(BuildFolderLock::try_acquire(&build_dir).unwrap().is_none());

        drop(held);
        assert!(BuildFolderLock::try_acquire(&build_dir).unwrap().is_some());
    }

    #[test]
    fn test_configurations_do_not_contend() {
        let temp = TempDir::new().unwrap();

        let _release = BuildFolderLock::acquire(&temp.path().join("build/Release")).unwrap();
        assert!(
            BuildFolderLock::try_acquire(&temp.path().join("build/Debug"))
                .unwrap()
                .is_some()
        );
    }
}
