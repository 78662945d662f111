//! HTTP implementations of the remote collaborators.
//!
//! All endpoints live under one base URL and authenticate with the stored
//! bearer credential. Error bodies of the form `{"detail": "..."}` are
//! surfaced in the error text.

mod document_directory;
mod inference_client;

pub use document_directory::HttpDocumentDirectory;
pub use inference_client::HttpInferenceClient;

use juris_core::auth::CredentialStore;
use juris_core::error::{JurisError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared plumbing: base URL, connection pool and credential lookup.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| JurisError::config(format!("Invalid API base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(JurisError::config(format!("Invalid API base URL '{}'", base_url)));
        }

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| JurisError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            http,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| JurisError::config(format!("Invalid API base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attaches the bearer credential; `AuthFailure` when signed out.
    pub(crate) async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let credential = self
            .credentials
            .load()
            .await?
            .ok_or_else(|| JurisError::auth("not signed in"))?;
        Ok(request.bearer_auth(credential.token()))
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
}

pub(crate) fn is_auth_status(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Reads a failed response into `"<status>: <detail>"`.
pub(crate) async fn failure_text(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("{}: {}", status, error_detail(&body))
}

/// Extracts `detail` from a JSON error body, or returns the trimmed body.
pub(crate) fn error_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
