//! Credential file DTOs and migrator.

use juris_core::auth::Credential;
use juris_core::error::{JurisError, Result};
use juris_core::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

/// Entity name the credential file is registered under.
pub const CREDENTIAL_ENTITY: &str = "credential";

/// Credential schema V1.0.0.
///
/// Stores the bearer token in `credentials.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct CredentialV1_0_0 {
    pub token: String,
    /// Instant of the sign-in, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<Timestamp>,
}

// ============================================================================
// Domain conversions
// ============================================================================

impl IntoDomain<Credential> for CredentialV1_0_0 {
    fn into_domain(self) -> Credential {
        Credential::new(self.token)
    }
}

impl FromDomain<Credential> for CredentialV1_0_0 {
    fn from_domain(credential: Credential) -> Self {
        Self {
            token: credential.token().to_string(),
            saved_at: Some(Timestamp::now()),
        }
    }
}

// ============================================================================
// Migrator
// ============================================================================

/// Creates the migrator for `credentials.toml`.
pub fn create_credential_migrator() -> Result<version_migrate::Migrator> {
    version_migrate::migrator!("credential" => [CredentialV1_0_0, Credential], save = true)
        .map_err(|e| JurisError::internal(format!("Failed to create credential migrator: {}", e)))
}
