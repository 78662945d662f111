//! TOML-file `SessionCache` implementation.

use crate::dto::{SESSION_CACHE_ENTITY, create_session_cache_migrator, flat_json_to_toml};
use crate::storage::AtomicTomlFile;
use juris_core::error::{JurisError, Result};
use juris_core::session::{CachedState, SessionCache};
use async_trait::async_trait;
use std::path::PathBuf;

/// Stores the session list and active pointer together in one TOML file.
///
/// The document is versioned and read through the session cache migrator.
/// File work runs on the blocking pool so callers on the async runtime are
/// never stalled by fsync.
#[derive(Debug, Clone)]
pub struct TomlSessionCache {
    file: AtomicTomlFile<toml::Value>,
}

impl TomlSessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicTomlFile::new(path.into()),
        }
    }
}

#[async_trait]
impl SessionCache for TomlSessionCache {
    async fn load(&self) -> Result<CachedState> {
        let file = self.file.clone();
        let stored = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| JurisError::internal(format!("Failed to join task: {}", e)))??;

        let Some(toml_value) = stored else {
            return Ok(CachedState::default());
        };

        let migrator = create_session_cache_migrator()?;
        let state: CachedState = migrator
            .load_flat_from(SESSION_CACHE_ENTITY, toml_value)
            .map_err(|e| {
                JurisError::serialization(
                    "TOML",
                    format!(
                        "Failed to migrate session cache from '{}': {}",
                        self.file.path().display(),
                        e
                    ),
                )
            })?;

        tracing::debug!(
            "[TomlSessionCache] Loaded {} sessions from {}",
            state.sessions.len(),
            self.file.path().display()
        );
        Ok(state)
    }

    async fn save(&self, state: &CachedState) -> Result<()> {
        let migrator = create_session_cache_migrator()?;
        let json_str = migrator
            .save_domain_flat(SESSION_CACHE_ENTITY, state)
            .map_err(|e| {
                JurisError::serialization("JSON", format!("Failed to serialize session cache: {}", e))
            })?;
        let document = flat_json_to_toml(&json_str)?;

        let file = self.file.clone();
        tokio::task::spawn_blocking(move || file.replace(&document))
            .await
            .map_err(|e| JurisError::internal(format!("Failed to join task: {}", e)))??;

        tracing::debug!(
            "[TomlSessionCache] Saved {} sessions (active: {:?})",
            state.sessions.len(),
            state.active.as_ref().map(|id| id.as_str())
        );
        Ok(())
    }
}
