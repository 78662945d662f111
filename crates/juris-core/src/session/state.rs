//! Conversation state and its transitions.
//!
//! `ConversationState` is the only shared mutable state of the application:
//! the session list, the active pointer and the set of sessions with an
//! exchange in flight. Every transition is a pure function from the previous
//! state (plus an event's inputs) to the next state, so the use case can apply
//! it under a lock, persist the result, and release the lock before talking to
//! any remote collaborator.

use super::cache::CachedState;
use super::message::Message;
use super::model::{Session, SessionId};
use super::reconcile::{ReconcileReport, reconcile};
use crate::auth::UserProfile;
use crate::document::DocumentSet;
use crate::error::{JurisError, Result};
use crate::timestamp::Timestamp;
use std::collections::HashSet;

/// Why `begin_exchange` refused to start an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeRejection {
    /// Trimmed input was empty.
    EmptyInput,
    /// The session already awaits a response.
    AlreadyInFlight,
    /// No session has the requested id.
    UnknownSession,
}

/// An accepted exchange, waiting for the inference call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeTicket {
    pub session_id: SessionId,
    /// Document identifier sent to inference (the session title).
    pub document_name: String,
    /// Trimmed user text.
    pub query: String,
}

/// Result of `complete_exchange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDelivery {
    /// Appended to its originating session.
    Delivered,
    /// The session no longer exists; the reply was discarded.
    SessionGone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    sessions: Vec<Session>,
    active: Option<SessionId>,
    in_flight: HashSet<SessionId>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds state from the durable cache.
    ///
    /// Repairs a stale `message_count` to the message length and an active
    /// pointer that names no cached session to the first session.
    pub fn from_cached(cached: CachedState) -> Self {
        let CachedState { mut sessions, active } = cached;

        for session in sessions.iter_mut() {
            if !session.is_consistent() {
                tracing::warn!(
                    "[ConversationState] Repairing message_count for {}: {} -> {}",
                    session.id(),
                    session.message_count,
                    session.messages.len()
                );
                session.message_count = session.messages.len();
            }
        }

        let active = match active {
            Some(id) if sessions.iter().any(|s| s.id() == id) => Some(id),
            _ => sessions.first().map(Session::id),
        };

        Self {
            sessions,
            active,
            in_flight: HashSet::new(),
        }
    }

    /// Snapshot for the durable cache. In-flight markers are not persisted.
    pub fn to_cached(&self) -> CachedState {
        CachedState {
            sessions: self.sessions.clone(),
            active: self.active.clone(),
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_id(&self) -> Option<&SessionId> {
        self.active.as_ref()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref().and_then(|id| self.session(id))
    }

    pub fn session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id() == id)
    }

    pub fn is_in_flight(&self, id: &SessionId) -> bool {
        self.in_flight.contains(id)
    }

    pub fn any_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    fn session_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| &s.id() == id)
    }

    // ============================================================================
    // Transitions
    // ============================================================================

    /// Merges the session list with a fresh directory snapshot.
    pub fn reconciled(&self, documents: &DocumentSet, now: Timestamp) -> (Self, ReconcileReport) {
        let merged = reconcile(&self.sessions, self.active.as_ref(), documents, now);
        let surviving: HashSet<SessionId> = merged.sessions.iter().map(Session::id).collect();

        let next = Self {
            sessions: merged.sessions,
            active: merged.active,
            in_flight: self
                .in_flight
                .iter()
                .filter(|id| surviving.contains(*id))
                .cloned()
                .collect(),
        };
        (next, merged.report)
    }

    /// Inserts a new pending session at the front and makes it active.
    ///
    /// If `now` collides with an existing pending id the creation instant is
    /// advanced one millisecond at a time until it is unique.
    pub fn with_pending_session(&self, now: Timestamp) -> (Self, SessionId) {
        let mut created_at = now;
        while self.session(&SessionId::for_pending(created_at)).is_some() {
            created_at = created_at.plus_millis(1);
        }

        let session = Session::pending(created_at);
        let id = session.id();

        let mut next = self.clone();
        next.sessions.insert(0, session);
        next.active = Some(id.clone());
        (next, id)
    }

    /// Points the active pointer at an existing session.
    pub fn with_active(&self, id: &SessionId) -> Result<Self> {
        if self.session(id).is_none() {
            return Err(JurisError::not_found("Session", id.as_str()));
        }
        let mut next = self.clone();
        next.active = Some(id.clone());
        Ok(next)
    }

    /// Removes every session titled `title`.
    ///
    /// If the active session was removed the pointer moves to the first
    /// remaining session, or to none.
    pub fn without_title(&self, title: &str) -> (Self, Vec<SessionId>) {
        let mut next = self.clone();
        let mut removed = Vec::new();

        next.sessions.retain(|s| {
            if s.title == title {
                removed.push(s.id());
                false
            } else {
                true
            }
        });

        for id in &removed {
            next.in_flight.remove(id);
        }

        if let Some(active) = &next.active
            && removed.contains(active)
        {
            next.active = next.sessions.first().map(Session::id);
        }

        (next, removed)
    }

    /// Pre-append step of an exchange.
    ///
    /// Appends the trimmed user message, marks the session in flight and
    /// returns the ticket for the inference call. Rejections leave the state
    /// unchanged.
    pub fn begin_exchange(
        &self,
        id: &SessionId,
        raw_text: &str,
        author: Option<&UserProfile>,
        now: Timestamp,
    ) -> std::result::Result<(Self, ExchangeTicket), ExchangeRejection> {
        let query = raw_text.trim();
        if query.is_empty() {
            return Err(ExchangeRejection::EmptyInput);
        }
        if self.is_in_flight(id) {
            return Err(ExchangeRejection::AlreadyInFlight);
        }

        let mut next = self.clone();
        let session = next
            .session_mut(id)
            .ok_or(ExchangeRejection::UnknownSession)?;

        session.append(Message::user(
            query,
            now,
            author.and_then(|p| p.picture.clone()),
            author.map(|p| p.initials.clone()),
        ));

        let ticket = ExchangeTicket {
            session_id: id.clone(),
            document_name: session.title.clone(),
            query: query.to_string(),
        };
        next.in_flight.insert(id.clone());

        Ok((next, ticket))
    }

    /// Post-append step of an exchange.
    ///
    /// Routed by session id, so a reply arriving after the user switched
    /// sessions still lands in the session that asked.
    pub fn complete_exchange(
        &self,
        id: &SessionId,
        reply: &str,
        now: Timestamp,
    ) -> (Self, ReplyDelivery) {
        let mut next = self.clone();
        next.in_flight.remove(id);

        match next.session_mut(id) {
            Some(session) => {
                session.append(Message::agent(reply, now));
                (next, ReplyDelivery::Delivered)
            }
            None => (next, ReplyDelivery::SessionGone),
        }
    }
}
