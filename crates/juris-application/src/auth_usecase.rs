//! Sign-in state.

use juris_core::auth::{Credential, CredentialStore, UserProfile};
use juris_core::error::{JurisError, Result};
use std::sync::Arc;

/// Manages the stored bearer credential and the profile decoded from it.
pub struct AuthUseCase {
    credentials: Arc<dyn CredentialStore>,
}

impl AuthUseCase {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    /// Stores `token` after checking that it decodes to a profile.
    ///
    /// # Errors
    ///
    /// `AuthFailure` if the token is not a decodable JWT; nothing is stored.
    pub async fn sign_in(&self, token: &str) -> Result<UserProfile> {
        let credential = Credential::new(token);
        if credential.token().is_empty() {
            return Err(JurisError::auth("empty token"));
        }
        let profile = credential.profile()?;
        self.credentials.store(&credential).await?;

        tracing::info!("[AuthUseCase] Signed in as {}", profile.email);
        Ok(profile)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.credentials.clear().await?;
        tracing::info!("[AuthUseCase] Signed out");
        Ok(())
    }

    /// Profile of the signed-in user, `None` when signed out.
    ///
    /// A stored token that no longer decodes is cleared and reported as
    /// `AuthFailure`, which routes the caller back to sign-in.
    pub async fn profile(&self) -> Result<Option<UserProfile>> {
        let Some(credential) = self.credentials.load().await? else {
            return Ok(None);
        };

        match credential.profile() {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                tracing::warn!("[AuthUseCase] Stored credential is unusable, clearing: {}", e);
                self.credentials.clear().await?;
                Err(e)
            }
        }
    }
}
