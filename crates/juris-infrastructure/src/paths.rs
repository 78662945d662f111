//! Path management for juris configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/juris/             # Config directory
//! ├── config.toml              # Application configuration
//! ├── sessions.toml            # Session cache and active pointer
//! ├── credentials.toml         # Bearer credential (mode 600)
//! └── logs/
//!     └── juris.log.YYYY-MM-DD
//! ```
//!
//! Setting `data_dir` (or `JURIS_DATA_DIR`) moves `sessions.toml` and
//! `credentials.toml` elsewhere; config and logs stay in the config directory.

use juris_core::error::{JurisError, Result};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "juris";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JurisPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl JurisPaths {
    /// Resolves the platform config directory, optionally with a separate data directory.
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        let config_dir = Self::default_config_dir()?;
        let data_dir = data_dir.map(Path::to_path_buf).unwrap_or_else(|| config_dir.clone());
        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// `~/.config/juris` (or the platform equivalent).
    fn default_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| JurisError::config("Cannot find home directory"))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    pub fn sessions_file(&self) -> PathBuf {
        self.data_dir.join("sessions.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.data_dir.join("credentials.toml")
    }
}
