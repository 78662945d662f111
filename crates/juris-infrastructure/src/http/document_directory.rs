//! HTTP `DocumentDirectory`.

use super::{ApiClient, failure_text, is_auth_status};
use juris_core::document::{DocumentDirectory, DocumentSet, DocumentUpload};
use juris_core::error::{JurisError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DocumentListResponse {
    #[serde(default)]
    documents: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Talks to `GET /documents`, `DELETE /documents/{name}` and
/// `POST /upload_document`.
///
/// Status 401/403 always maps to `AuthFailure`. Every other failure maps to
/// the operation's own variant (`TransientFetchFailure`, `DeletionFailure`,
/// `UploadFailure`).
#[derive(Clone)]
pub struct HttpDocumentDirectory {
    api: ApiClient,
}

impl HttpDocumentDirectory {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DocumentDirectory for HttpDocumentDirectory {
    async fn list(&self) -> Result<DocumentSet> {
        let url = self.api.endpoint(&["documents"])?;
        let request = self.api.authorized(self.api.http().get(url)).await?;

        let response = request
            .send()
            .await
            .map_err(|e| JurisError::transient_fetch(format!("Failed to reach directory: {}", e)))?;

        let status = response.status();
        if is_auth_status(status) {
            return Err(JurisError::auth(failure_text(response).await));
        }
        if !status.is_success() {
            return Err(JurisError::transient_fetch(failure_text(response).await));
        }

        let body = response
            .json::<DocumentListResponse>()
            .await
            .map_err(|e| JurisError::transient_fetch(format!("Failed to parse document list: {}", e)))?;

        tracing::debug!("[DocumentDirectory] Listed {} documents", body.documents.len());
        Ok(body.documents.into_iter().collect())
    }

    async fn delete(&self, document_name: &str) -> Result<()> {
        let url = self.api.endpoint(&["documents", document_name])?;
        let request = self.api.authorized(self.api.http().delete(url)).await?;

        let response = request
            .send()
            .await
            .map_err(|e| JurisError::deletion(format!("Failed to reach directory: {}", e)))?;

        let status = response.status();
        if is_auth_status(status) {
            return Err(JurisError::auth(failure_text(response).await));
        }
        if !status.is_success() {
            return Err(JurisError::deletion(failure_text(response).await));
        }

        tracing::info!("[DocumentDirectory] Deleted '{}'", document_name);
        Ok(())
    }

    async fn upload(&self, upload: DocumentUpload) -> Result<String> {
        let url = self.api.endpoint(&["upload_document"])?;
        let file_name = upload.file_name.clone();
        let form = Form::new().part("file", Part::bytes(upload.bytes).file_name(upload.file_name));
        let request = self.api.authorized(self.api.http().post(url).multipart(form)).await?;

        let response = request
            .send()
            .await
            .map_err(|e| JurisError::upload(format!("Failed to reach directory: {}", e)))?;

        let status = response.status();
        if is_auth_status(status) {
            return Err(JurisError::auth(failure_text(response).await));
        }
        if !status.is_success() {
            return Err(JurisError::upload(failure_text(response).await));
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<UploadResponse>(&text)
            .ok()
            .and_then(|r| r.message)
            .unwrap_or_else(|| format!("Uploaded {}", file_name));

        tracing::info!("[DocumentDirectory] Uploaded '{}'", file_name);
        Ok(message)
    }
}
