//! Bearer credential and the signed-in user's profile.
//!
//! The credential is an opaque bearer token issued by the backend after the
//! OAuth sign-in. Its JWT payload carries the display identity used to stamp
//! user messages; the signature is not checked here (the backend does that on
//! every request).

use crate::error::{JurisError, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// Decodes the display identity from the token's JWT payload.
    ///
    /// Fails with `AuthFailure` when the token is not a three-part JWT or the
    /// payload is not base64url-encoded JSON.
    pub fn profile(&self) -> Result<UserProfile> {
        let payload = self
            .0
            .split('.')
            .nth(1)
            .filter(|part| !part.is_empty())
            .ok_or_else(|| JurisError::auth("token is not a JWT"))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| JurisError::auth(format!("token payload is not base64url: {e}")))?;

        let claims: TokenClaims = serde_json::from_slice(&bytes)
            .map_err(|e| JurisError::auth(format!("token payload is not valid JSON: {e}")))?;

        Ok(UserProfile::from_claims(claims))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Display identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    pub initials: String,
}

impl UserProfile {
    fn from_claims(claims: TokenClaims) -> Self {
        let email = claims.sub.unwrap_or_default();
        let name = claims
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());
        let initials = name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_else(|| "?".to_string());

        Self {
            name,
            email,
            picture: claims.picture,
            initials,
        }
    }
}

/// Persistent home of the bearer credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<Credential>>;

    async fn store(&self, credential: &Credential) -> Result<()>;

    /// Forgets the credential. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<()>;
}
