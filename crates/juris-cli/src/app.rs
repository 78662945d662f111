//! Wiring of the concrete collaborators.

use anyhow::{Context, Result};
use juris_application::{AuthUseCase, ConversationUseCase};
use juris_core::auth::CredentialStore;
use juris_core::config::AppConfig;
use juris_core::session::{InMemorySessionCache, SessionCache};
use juris_infrastructure::{
    ApiClient, ConfigService, FileCredentialStore, HttpDocumentDirectory, HttpInferenceClient,
    JurisPaths, TomlSessionCache,
};
use std::sync::Arc;

pub struct Options {
    pub api_url: Option<String>,
    pub ephemeral: bool,
}

pub struct App {
    pub config: AppConfig,
    pub conversation: Arc<ConversationUseCase>,
    pub auth: AuthUseCase,
}

impl App {
    pub fn build(options: Options) -> Result<Self> {
        let config_file = JurisPaths::new(None)?.config_file();
        let mut config = ConfigService::new(config_file.clone())
            .load()
            .with_context(|| format!("Failed to load {}", config_file.display()))?;
        if let Some(url) = options.api_url {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }

        let paths = JurisPaths::new(config.data_dir.as_deref())?;

        let credentials: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(paths.credentials_file()));
        let cache: Arc<dyn SessionCache> = if options.ephemeral {
            Arc::new(InMemorySessionCache::new())
        } else {
            Arc::new(TomlSessionCache::new(paths.sessions_file()))
        };

        let api = ApiClient::new(&config.api_base_url, credentials.clone())?;
        let conversation = Arc::new(ConversationUseCase::new(
            cache,
            Arc::new(HttpDocumentDirectory::new(api.clone())),
            Arc::new(HttpInferenceClient::new(api)),
            credentials.clone(),
        ));

        tracing::info!(
            "[App] api={} data={} ephemeral={}",
            config.api_base_url,
            paths.data_dir().display(),
            options.ephemeral
        );

        Ok(Self {
            config,
            conversation,
            auth: AuthUseCase::new(credentials),
        })
    }
}
