//! File-backed `CredentialStore`.

use crate::dto::{CREDENTIAL_ENTITY, create_credential_migrator, flat_json_to_toml};
use crate::storage::AtomicTomlFile;
use juris_core::auth::{Credential, CredentialStore};
use juris_core::error::{JurisError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Keeps the bearer credential in `credentials.toml`.
///
/// # Security Note
///
/// The file is restricted to the owner (mode 600) on Unix after every write.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    file: AtomicTomlFile<toml::Value>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicTomlFile::new(path.into()),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>> {
        let file = self.file.clone();
        let stored = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| JurisError::internal(format!("Failed to join task: {}", e)))??;

        let Some(toml_value) = stored else {
            return Ok(None);
        };

        let migrator = create_credential_migrator()?;
        let credential: Credential = migrator
            .load_flat_from(CREDENTIAL_ENTITY, toml_value)
            .map_err(|e| {
                JurisError::serialization(
                    "TOML",
                    format!(
                        "Failed to migrate credential from '{}': {}",
                        self.file.path().display(),
                        e
                    ),
                )
            })?;

        Ok(Some(credential).filter(|c| !c.token().is_empty()))
    }

    async fn store(&self, credential: &Credential) -> Result<()> {
        let migrator = create_credential_migrator()?;
        let json_str = migrator
            .save_domain_flat(CREDENTIAL_ENTITY, credential)
            .map_err(|e| {
                JurisError::serialization("JSON", format!("Failed to serialize credential: {}", e))
            })?;
        let document = flat_json_to_toml(&json_str)?;

        let file = self.file.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            file.replace(&document)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600))?;
            }

            Ok(())
        })
        .await
        .map_err(|e| JurisError::internal(format!("Failed to join task: {}", e)))??;

        tracing::info!("[CredentialStore] Credential stored");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || file.remove())
            .await
            .map_err(|e| JurisError::internal(format!("Failed to join task: {}", e)))??;

        tracing::info!("[CredentialStore] Credential cleared");
        Ok(())
    }
}
