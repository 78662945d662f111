//! HTTP `InferenceClient`.

use super::{ApiClient, failure_text};
use juris_core::error::{JurisError, Result};
use juris_core::inference::InferenceClient;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    policy_filename: &'a str,
    user_query: &'a str,
}

/// Talks to `POST /query`.
///
/// No request timeout is set: answers may take as long as the model needs.
/// Every failure, including a missing credential, is an `InferenceFailure`.
#[derive(Clone)]
pub struct HttpInferenceClient {
    api: ApiClient,
}

impl HttpInferenceClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn query(&self, document_name: &str, text: &str) -> Result<Value> {
        let url = self.api.endpoint(&["query"])?;
        let body = QueryRequest {
            policy_filename: document_name,
            user_query: text,
        };
        let request = self
            .api
            .authorized(self.api.http().post(url).json(&body))
            .await
            .map_err(|e| JurisError::inference(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| JurisError::inference(format!("Failed to reach inference service: {}", e)))?;

        if !response.status().is_success() {
            return Err(JurisError::inference(failure_text(response).await));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| JurisError::inference(format!("Failed to parse inference response: {}", e)))
    }
}
