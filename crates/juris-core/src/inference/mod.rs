//! Inference collaborator contract and reply formatting.

mod format;

pub use format::{FALLBACK_REPLY, format_inference_response};

use crate::error::Result;
use async_trait::async_trait;

/// Remote question-answering service scoped to one document.
///
/// The payload is returned as raw JSON: it is either a decision
/// (`decision`, `amount`, `justification`) or an error (`error`,
/// `raw_output`), and anything else is still shown to the user verbatim.
/// Transport, status and decoding failures map to
/// [`JurisError::InferenceFailure`](crate::JurisError::InferenceFailure).
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn query(&self, document_name: &str, text: &str) -> Result<serde_json::Value>;
}
