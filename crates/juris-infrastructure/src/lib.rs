//! Infrastructure layer of JURIS: file-backed stores, configuration and the
//! HTTP collaborators.

pub mod config_service;
pub mod dto;
pub mod file_credential_store;
pub mod http;
pub mod paths;
pub mod storage;
pub mod toml_session_cache;

pub use crate::config_service::ConfigService;
pub use crate::file_credential_store::FileCredentialStore;
pub use crate::http::{ApiClient, HttpDocumentDirectory, HttpInferenceClient};
pub use crate::paths::JurisPaths;
pub use crate::toml_session_cache::TomlSessionCache;
