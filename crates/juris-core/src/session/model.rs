//! Session domain model.
//!
//! A session is either bound to a remote document or pending a binding. The
//! binding decides reconciliation eligibility, so it is modelled as a tagged
//! variant ([`SessionKind`]) and the string id is derived from it.

use super::message::Message;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Id prefix for document-bound sessions.
pub const DOCUMENT_SESSION_PREFIX: &str = "doc-";
/// Id prefix for pending sessions.
pub const PENDING_SESSION_PREFIX: &str = "new-session-";
/// Title given to every pending session.
pub const PENDING_SESSION_TITLE: &str = "New Query Session";
/// Preview shown for a document session that has no messages yet.
pub const EMPTY_DOCUMENT_PREVIEW: &str = "Ask a question about this document";

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// `doc-<document name>`
    pub fn for_document(document_name: &str) -> Self {
        Self(format!("{DOCUMENT_SESSION_PREFIX}{document_name}"))
    }

    /// `new-session-<creation instant in Unix millis>`
    pub fn for_pending(created_at: Timestamp) -> Self {
        Self(format!(
            "{PENDING_SESSION_PREFIX}{}",
            created_at.timestamp_millis()
        ))
    }

    /// Wraps a raw id received from the presentation layer.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What a session is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionKind {
    /// Bound to a document that exists in the remote directory.
    DocumentBound { document_name: String },
    /// Created locally, waiting for a document upload.
    Pending { created_at: Timestamp },
}

impl SessionKind {
    pub fn id(&self) -> SessionId {
        match self {
            SessionKind::DocumentBound { document_name } => SessionId::for_document(document_name),
            SessionKind::Pending { created_at } => SessionId::for_pending(*created_at),
        }
    }
}

/// A persisted conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub kind: SessionKind,
    /// Display title. For document sessions this is the document name and is
    /// the join key against the remote directory.
    pub title: String,
    pub last_message_preview: String,
    /// Last activity instant.
    pub timestamp: Timestamp,
    /// Always equal to `messages.len()` once a transition settles.
    pub message_count: usize,
    pub messages: Vec<Message>,
}

impl Session {
    /// Materializes an empty session for a newly seen document.
    pub fn for_document(document_name: impl Into<String>, now: Timestamp) -> Self {
        let document_name = document_name.into();
        Self {
            title: document_name.clone(),
            kind: SessionKind::DocumentBound { document_name },
            last_message_preview: EMPTY_DOCUMENT_PREVIEW.to_string(),
            timestamp: now,
            message_count: 0,
            messages: Vec::new(),
        }
    }

    /// Creates an empty pending session.
    pub fn pending(created_at: Timestamp) -> Self {
        Self {
            kind: SessionKind::Pending { created_at },
            title: PENDING_SESSION_TITLE.to_string(),
            last_message_preview: String::new(),
            timestamp: created_at,
            message_count: 0,
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.kind.id()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.kind, SessionKind::Pending { .. })
    }

    /// The bound document name, if any.
    pub fn document_name(&self) -> Option<&str> {
        match &self.kind {
            SessionKind::DocumentBound { document_name } => Some(document_name),
            SessionKind::Pending { .. } => None,
        }
    }

    /// Appends a message and moves count, preview and timestamp along with it.
    pub fn append(&mut self, message: Message) {
        self.last_message_preview = message.content.clone();
        self.timestamp = message.timestamp;
        self.messages.push(message);
        self.message_count = self.messages.len();
    }

    pub fn is_consistent(&self) -> bool {
        self.message_count == self.messages.len()
    }
}
