//! Platform directory resolution.
//!
//! Config and log locations follow OS conventions (XDG on Linux, Known
//! Folders on Windows, Library on macOS) unless the caller supplies a config
//! directory explicitly.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during platform operations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// Directory creation failed.
    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Directories the generator reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds the debug-build JSON log.
    pub log_dir: PathBuf,
}

pub const APP_NAME: &str = "terra";

impl PlatformDirs {
    /// Resolve OS directories without creating them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let app_config = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);

        let log_dir = dirs::state_dir()
            .or_else(dirs::cache_dir)
            .map(|base| base.join(APP_NAME).join("logs"))
            .unwrap_or_else(|| app_config.join("logs"));

        Ok(Self {
            config_dir: app_config,
            log_dir,
        })
    }

    /// Use `config_dir` as given, with logs in a `logs` subdirectory.
    pub fn with_config_dir(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            log_dir: config_dir.join("logs"),
        }
    }

    /// An explicit config directory if one was given, the OS locations
    /// otherwise.
    pub fn resolve_or(config_dir: Option<&Path>) -> Result<Self, PlatformError> {
        match config_dir {
            Some(dir) => Ok(Self::with_config_dir(dir)),
            None => Self::resolve(),
        }
    }

    /// Create all directories on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] if any directory cannot be created.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}
