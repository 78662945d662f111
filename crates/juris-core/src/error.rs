//! Error types for the Juris application.

use thiserror::Error;

/// A shared error type for the entire Juris workspace.
///
/// Remote collaborator failures have their own variants so the use case can
/// decide how to surface them (degraded state, sign-in prompt, notification)
/// without inspecting message text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JurisError {
    /// The remote document directory could not be reached or answered with a
    /// non-auth failure. No local session was touched.
    #[error("Document directory unavailable: {0}")]
    TransientFetchFailure(String),

    /// Missing or invalid bearer credential.
    #[error("Authentication required: {0}")]
    AuthFailure(String),

    /// The inference collaborator failed (network, status, malformed payload).
    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    /// The remote directory rejected a deletion.
    #[error("Deletion failed: {0}")]
    DeletionFailure(String),

    /// The remote directory rejected an upload.
    #[error("Upload failed: {0}")]
    UploadFailure(String),

    /// A session (or other keyed value) that does not exist.
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Local file system failure (cache, credential or config file).
    #[error("IO error: {message}")]
    Io { message: String },

    /// A stored file or remote payload could not be (de)serialized.
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "RFC3339", ...
        message: String,
    },

    /// Invalid configuration value, such as an unparsable API URL.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Broken invariant.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JurisError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn serialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn transient_fetch(message: impl Into<String>) -> Self {
        Self::TransientFetchFailure(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthFailure(message.into())
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::InferenceFailure(message.into())
    }

    pub fn deletion(message: impl Into<String>) -> Self {
        Self::DeletionFailure(message.into())
    }

    pub fn upload(message: impl Into<String>) -> Self {
        Self::UploadFailure(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthFailure(_))
    }

    pub fn is_transient_fetch_failure(&self) -> bool {
        matches!(self, Self::TransientFetchFailure(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for JurisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for JurisError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON", err.to_string())
    }
}

impl From<toml::de::Error> for JurisError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization("TOML", err.to_string())
    }
}

impl From<toml::ser::Error> for JurisError {
    fn from(err: toml::ser::Error) -> Self {
        Self::serialization("TOML", err.to_string())
    }
}

/// A type alias for `Result<T, JurisError>`.
pub type Result<T> = std::result::Result<T, JurisError>;
