//! Configuration loading.
//!
//! Reads `config.toml` and layers the environment overrides on top. A missing
//! file means defaults; a malformed one is reported, not ignored.

use crate::storage::AtomicTomlFile;
use juris_core::config::AppConfig;
use juris_core::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicTomlFile<AppConfig>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicTomlFile::new(path.into()),
        }
    }

    /// Loads the file and applies overrides from the process environment.
    pub fn load(&self) -> Result<AppConfig> {
        Ok(self.read_file()?.with_env_overrides())
    }

    fn read_file(&self) -> Result<AppConfig> {
        let from_file = self.file.load()?;
        if from_file.is_none() {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                self.file.path().display()
            );
        }
        Ok(from_file.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juris_core::config::{API_URL_ENV, DEFAULT_API_BASE_URL};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        let config = service.read_file().unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_file_then_env_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "api_base_url = \"http://files.internal:9000\"\n").unwrap();
        let service = ConfigService::new(path);

        let from_file = service.read_file().unwrap();
        assert_eq!(from_file.api_base_url, "http://files.internal:9000");

        let from_env = service
            .read_file()
            .unwrap()
            .with_overrides(|k| (k == API_URL_ENV).then(|| "http://env:1".to_string()));
        assert_eq!(from_env.api_base_url, "http://env:1");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "api_base_url = 3").unwrap();

        assert!(ConfigService::new(path).read_file().is_err());
    }

    #[test]
    fn test_data_dir_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = \"/srv/juris\"\n").unwrap();

        let config = ConfigService::new(path).read_file().unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.data_dir.as_deref(), Some(std::path::Path::new("/srv/juris")));
    }
}
