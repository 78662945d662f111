//! Results handed back to the presentation layer.

use juris_core::error::Result;
use juris_core::session::{
    ExchangeRejection, ReconcileReport, ReplyDelivery, Session, SessionId,
};

/// Signal that a freshly created pending session wants a document.
///
/// The presentation layer answers it by prompting for an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBindingRequested {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSessionCreated {
    pub session: Session,
    pub binding_requested: DocumentBindingRequested,
}

/// What became of a `send_message` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was appended.
    Rejected(ExchangeRejection),
    /// The exchange ran to the end.
    Completed {
        session_id: SessionId,
        /// Agent text: the formatted answer, or the fallback on failure.
        reply: String,
        /// True when `reply` is the fallback text.
        inference_failed: bool,
        delivery: ReplyDelivery,
    },
}

impl SendOutcome {
    pub fn reply(&self) -> Option<&str> {
        match self {
            SendOutcome::Completed { reply, .. } => Some(reply),
            SendOutcome::Rejected(_) => None,
        }
    }
}

/// A successful upload and the reconciliation that followed it.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    /// Message returned by the directory.
    pub message: String,
    pub sync: Result<ReconcileReport>,
}

/// A successful deletion and the reconciliation that followed it.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub removed: Vec<SessionId>,
    pub sync: Result<ReconcileReport>,
}
