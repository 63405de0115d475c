//! Platform directory resolution.
//!
//! Config and log locations follow OS conventions (XDG on Linux, Known
//! Folders on Windows, Library on macOS) via the `dirs` crate.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while resolving or creating directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// Directory creation failed.
    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Directories used by the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// JSON log files (debug builds).
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "vale";

impl PlatformDirs {
    /// Resolve OS directories without creating them.
    pub fn resolve() -> Result<Self, PlatformError> {
        let base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        Ok(Self::under(&base.join(APP_NAME)))
    }

    /// Use an explicit config directory (e.g. from `--config`); logs go
    /// beside it.
    pub fn with_config_dir(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            log_dir: config_dir.join("logs"),
        }
    }

    fn under(app_dir: &Path) -> Self {
        Self {
            config_dir: app_dir.join("config"),
            log_dir: app_dir.join("logs"),
        }
    }

    /// Create every directory on disk.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_absolute() {
        let dirs = PlatformDirs::resolve().expect("PlatformDirs::resolve() failed");
        assert!(dirs.config_dir.is_absolute(), "config_dir is not absolute");
        assert!(dirs.log_dir.is_absolute(), "log_dir is not absolute");
        assert!(dirs.config_dir.ends_with("config"));
    }

    #[test]
    fn test_explicit_config_dir() {
        let dirs = PlatformDirs::with_config_dir(Path::new("/tmp/vale-cfg"));
        assert_eq!(dirs.config_dir, PathBuf::from("/tmp/vale-cfg"));
        assert_eq!(dirs.log_dir, PathBuf::from("/tmp/vale-cfg").join("logs"));
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::under(&tmp.path().join(APP_NAME));
        dirs.create_dirs().expect("create_dirs failed for temp root");
        assert!(dirs.config_dir.exists(), "config_dir was not created");
        assert!(dirs.log_dir.exists(), "log_dir was not created");
    }
}
