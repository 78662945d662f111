//! Conversation message types.

use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// Message typed by the signed-in user.
    User,
    /// Reply produced by the inference collaborator (or the fallback text).
    Agent,
}

/// A single message in a session history.
///
/// Messages are immutable once created; a session only ever appends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_initials: Option<String>,
}

impl Message {
    /// Creates a user message. Avatar and initials come from the signed-in profile.
    pub fn user(
        content: impl Into<String>,
        timestamp: Timestamp,
        sender_avatar: Option<String>,
        sender_initials: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender: Sender::User,
            timestamp,
            sender_avatar,
            sender_initials,
        }
    }

    /// Creates an agent message.
    pub fn agent(content: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender: Sender::Agent,
            timestamp,
            sender_avatar: None,
            sender_initials: None,
        }
    }
}
