//! Application configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Base URL used when neither the config file nor the environment names one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding [`AppConfig::api_base_url`].
pub const API_URL_ENV: &str = "JURIS_API_URL";
/// Environment variable overriding [`AppConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "JURIS_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root of the document and query API, without a trailing slash.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Directory holding the session cache and credential file. Defaults to
    /// the platform config directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Applies overrides looked up through `lookup`. Blank values are ignored.
    ///
    /// Takes a lookup function instead of reading the process environment so
    /// callers and tests can supply their own source.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir.trim()));
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }
}
