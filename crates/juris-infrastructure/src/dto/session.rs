//! Session cache DTOs and migrator.
//!
//! Layout of `sessions.toml`:
//!
//! ```toml
//! version = "1.0.0"
//! active_session_id = "doc-policy_a.pdf"
//!
//! [[sessions]]
//! id = "doc-policy_a.pdf"
//! kind = "document"
//! document_name = "policy_a.pdf"
//! title = "policy_a.pdf"
//! last_message_preview = "Ask a question about this document"
//! timestamp = "2024-04-01T12:00:00.482913Z"
//! message_count = 0
//! ```
//!
//! Instants are stored as RFC 3339 text and parsed back through
//! `Timestamp::parse_rfc3339`; a malformed one fails the whole load.

use juris_core::error::{JurisError, Result};
use juris_core::session::{
    CachedState, Message, PENDING_SESSION_PREFIX, Sender, Session, SessionId, SessionKind,
};
use juris_core::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

/// Entity name the session cache is registered under.
pub const SESSION_CACHE_ENTITY: &str = "session_cache";

/// Session cache schema V1.0.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct SessionCacheV1_0_0 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_session_id: Option<String>,
    #[serde(default)]
    pub sessions: Vec<SessionDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDto {
    pub id: String,
    #[serde(flatten)]
    pub kind: SessionKindDto,
    pub title: String,
    #[serde(default)]
    pub last_message_preview: String,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub message_count: usize,
    #[serde(default)]
    pub messages: Vec<MessageDto>,
}

/// Stored as a `kind` tag next to the session fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionKindDto {
    Document {
        document_name: String,
    },
    Pending {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        created_at: Option<Timestamp>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub sender: Sender,
    pub timestamp: Timestamp,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_initials: Option<String>,
}

// ============================================================================
// Domain model conversions
// ============================================================================

/// Rehydrates the cached state.
///
/// Sessions whose stored id disagrees with their kind are re-keyed, and an
/// active pointer that names no stored session falls back to the first
/// session.
impl IntoDomain<CachedState> for SessionCacheV1_0_0 {
    fn into_domain(self) -> CachedState {
        let mut active = self.active_session_id.map(SessionId::from_raw);
        let mut sessions: Vec<Session> = Vec::with_capacity(self.sessions.len());

        for dto in self.sessions {
            let stored_id = dto.id.clone();
            let session = dto.into_session();
            let derived = session.id();

            if derived.as_str() != stored_id {
                tracing::warn!(
                    "[SessionCache] Re-keying session '{}' to '{}'",
                    stored_id,
                    derived
                );
                if active.as_ref().is_some_and(|a| a.as_str() == stored_id) {
                    active = Some(derived.clone());
                }
            }
            sessions.push(session);
        }

        if let Some(pointer) = &active
            && !sessions.iter().any(|s| &s.id() == pointer)
        {
            let repaired = sessions.first().map(Session::id);
            tracing::warn!(
                "[SessionCache] Active session '{}' is not cached; falling back to {:?}",
                pointer,
                repaired.as_ref().map(SessionId::as_str)
            );
            active = repaired;
        }

        CachedState { sessions, active }
    }
}

impl FromDomain<CachedState> for SessionCacheV1_0_0 {
    fn from_domain(state: CachedState) -> Self {
        Self {
            active_session_id: state.active.map(|id| id.as_str().to_string()),
            sessions: state.sessions.iter().map(SessionDto::from).collect(),
        }
    }
}

impl From<&Session> for SessionDto {
    fn from(session: &Session) -> Self {
        let kind = match &session.kind {
            SessionKind::DocumentBound { document_name } => SessionKindDto::Document {
                document_name: document_name.clone(),
            },
            SessionKind::Pending { created_at } => SessionKindDto::Pending {
                created_at: Some(*created_at),
            },
        };

        Self {
            id: session.id().as_str().to_string(),
            kind,
            title: session.title.clone(),
            last_message_preview: session.last_message_preview.clone(),
            timestamp: session.timestamp,
            message_count: session.message_count,
            messages: session.messages.iter().map(MessageDto::from).collect(),
        }
    }
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            sender: message.sender,
            timestamp: message.timestamp,
            content: message.content.clone(),
            sender_avatar: message.sender_avatar.clone(),
            sender_initials: message.sender_initials.clone(),
        }
    }
}

impl SessionDto {
    fn into_session(self) -> Session {
        let kind = match self.kind {
            SessionKindDto::Document { document_name } => SessionKind::DocumentBound { document_name },
            SessionKindDto::Pending { created_at } => {
                let created_at = created_at
                    .or_else(|| created_at_from_id(&self.id))
                    .unwrap_or_else(|| {
                        tracing::warn!(
                            "[SessionCache] Pending session '{}' has no creation instant; using its last activity",
                            self.id
                        );
                        self.timestamp
                    });
                SessionKind::Pending { created_at }
            }
        };

        Session {
            kind,
            title: self.title,
            last_message_preview: self.last_message_preview,
            timestamp: self.timestamp,
            message_count: self.message_count,
            messages: self.messages.into_iter().map(MessageDto::into_message).collect(),
        }
    }
}

impl MessageDto {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            sender: self.sender,
            timestamp: self.timestamp,
            content: self.content,
            sender_avatar: self.sender_avatar,
            sender_initials: self.sender_initials,
        }
    }
}

/// Recovers the creation instant encoded in a pending id (`new-session-<millis>`).
fn created_at_from_id(id: &str) -> Option<Timestamp> {
    id.strip_prefix(PENDING_SESSION_PREFIX)
        .and_then(|millis| millis.parse::<i64>().ok())
        .and_then(|millis| Timestamp::from_millis(millis).ok())
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates the migrator for `sessions.toml`.
///
/// # Migration Path
///
/// - V1.0.0 → CachedState
pub fn create_session_cache_migrator() -> Result<version_migrate::Migrator> {
    version_migrate::migrator!("session_cache" => [SessionCacheV1_0_0, CachedState], save = true)
        .map_err(|e| JurisError::internal(format!("Failed to create session_cache migrator: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis).unwrap()
    }

    fn document_dto(name: &str) -> SessionDto {
        SessionDto::from(&Session::for_document(name, ts(1_000)))
    }

    fn cache_of(active: Option<&str>, sessions: Vec<SessionDto>) -> SessionCacheV1_0_0 {
        SessionCacheV1_0_0 {
            active_session_id: active.map(str::to_string),
            sessions,
        }
    }

    #[test]
    fn test_domain_round_trip_preserves_instants() {
        let mut doc = Session::for_document("policy_a.pdf", Timestamp::now());
        doc.append(Message::user("covered?", Timestamp::now(), None, Some("J".into())));
        doc.append(Message::agent("Decision: approved\n", Timestamp::now()));
        let pending = Session::pending(ts(1_712_000_002_000));
        let state = CachedState {
            active: Some(doc.id()),
            sessions: vec![pending, doc],
        };

        let loaded = SessionCacheV1_0_0::from_domain(state.clone()).into_domain();

        assert_eq!(loaded, state);
        assert!(loaded.sessions[1].messages[0].timestamp <= loaded.sessions[1].messages[1].timestamp);
    }

    #[test]
    fn test_mismatched_id_is_rekeyed_and_pointer_follows() {
        let mut dto = document_dto("a.pdf");
        dto.id = "legacy-a".to_string();

        let loaded = cache_of(Some("legacy-a"), vec![dto]).into_domain();

        assert_eq!(loaded.sessions[0].id().as_str(), "doc-a.pdf");
        assert_eq!(loaded.active, Some(SessionId::for_document("a.pdf")));
    }

    #[test]
    fn test_dangling_active_pointer_is_repaired() {
        let loaded = cache_of(
            Some("doc-gone.pdf"),
            vec![document_dto("b.pdf"), document_dto("c.pdf")],
        )
        .into_domain();
        assert_eq!(loaded.active, Some(SessionId::for_document("b.pdf")));

        let empty = cache_of(Some("doc-gone.pdf"), Vec::new()).into_domain();
        assert_eq!(empty.active, None);
    }

    #[test]
    fn test_pending_without_created_at_uses_id() {
        let mut dto = SessionDto::from(&Session::pending(ts(1_712_000_000_123)));
        dto.kind = SessionKindDto::Pending { created_at: None };

        let loaded = cache_of(None, vec![dto]).into_domain();

        assert_eq!(loaded.sessions[0].id().as_str(), "new-session-1712000000123");
    }

    #[test]
    fn test_migrator_loads_flat_toml() {
        let migrator = create_session_cache_migrator().unwrap();
        let toml_str = r#"
version = "1.0.0"
active_session_id = "doc-a.pdf"

[[sessions]]
id = "doc-a.pdf"
kind = "document"
document_name = "a.pdf"
title = "a.pdf"
last_message_preview = "Ask a question about this document"
timestamp = "2024-04-01T12:00:00.482913Z"
message_count = 0

[[sessions]]
id = "new-session-1712000000123"
kind = "pending"
title = "New Session"
timestamp = "2024-04-01T12:00:01Z"
"#;
        let toml_value: toml::Value = toml::from_str(toml_str).unwrap();

        let state: CachedState = migrator.load_flat_from(SESSION_CACHE_ENTITY, toml_value).unwrap();

        assert_eq!(state.sessions.len(), 2);
        assert_eq!(state.active, Some(SessionId::for_document("a.pdf")));
        assert_eq!(
            state.sessions[0].timestamp,
            Timestamp::parse_rfc3339("2024-04-01T12:00:00.482913Z").unwrap()
        );
        assert!(state.sessions[1].is_pending());
        assert_eq!(state.sessions[1].id().as_str(), "new-session-1712000000123");
    }

    #[test]
    fn test_migrator_rejects_document_without_name() {
        let migrator = create_session_cache_migrator().unwrap();
        let toml_value: toml::Value = toml::from_str(
            r#"
version = "1.0.0"

[[sessions]]
id = "doc-a.pdf"
kind = "document"
title = "a.pdf"
timestamp = "2024-04-01T12:00:00Z"
"#,
        )
        .unwrap();

        let result: std::result::Result<CachedState, _> =
            migrator.load_flat_from(SESSION_CACHE_ENTITY, toml_value);

        assert!(result.is_err());
    }

    #[test]
    fn test_migrator_rejects_unknown_version() {
        let migrator = create_session_cache_migrator().unwrap();
        let toml_value: toml::Value = toml::from_str("version = \"9.0.0\"\nsessions = []\n").unwrap();

        let result: std::result::Result<CachedState, _> =
            migrator.load_flat_from(SESSION_CACHE_ENTITY, toml_value);

        assert!(result.is_err());
    }

    #[test]
    fn test_save_writes_version_field() {
        let migrator = create_session_cache_migrator().unwrap();
        let state = CachedState {
            active: None,
            sessions: vec![Session::for_document("a.pdf", ts(1_000))],
        };

        let json_str = migrator.save_domain_flat(SESSION_CACHE_ENTITY, &state).unwrap();
        let json: serde_json::Value = serde_json::from_str(&json_str).unwrap();

        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["sessions"][0]["kind"], "document");
        assert_eq!(json["sessions"][0]["document_name"], "a.pdf");
    }
}
