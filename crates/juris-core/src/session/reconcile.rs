//! Session ↔ document reconciliation.
//!
//! Merges the cached session list with a fresh [`DocumentSet`]. Pure: the
//! caller fetches the directory, calls [`reconcile`], and persists the result.

use super::model::{Session, SessionId, SessionKind};
use crate::document::DocumentSet;
use crate::timestamp::Timestamp;
use std::collections::{HashMap, HashSet};

/// Ids touched by one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Document sessions materialized for newly seen documents.
    pub created: Vec<SessionId>,
    /// Sessions carried over (pending ones included).
    pub retained: Vec<SessionId>,
    /// Orphaned document sessions removed together with their history.
    pub dropped: Vec<SessionId>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.dropped.is_empty()
    }
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub sessions: Vec<Session>,
    pub active: Option<SessionId>,
    pub report: ReconcileReport,
}

/// Merges `previous` with `documents`.
///
/// - Document sessions whose name is in `documents` keep their history; the
///   title is refreshed to the directory's spelling.
/// - Documents with no session get a new empty one stamped `now`.
/// - Pending sessions always survive.
/// - Document sessions whose name is absent are dropped.
///
/// Retained sessions keep their previous relative order; new sessions follow
/// in directory order.
pub fn reconcile(
    previous: &[Session],
    active: Option<&SessionId>,
    documents: &DocumentSet,
    now: Timestamp,
) -> Reconciliation {
    let mut report = ReconcileReport::default();
    let mut sessions = Vec::with_capacity(previous.len() + documents.len());
    let mut seen: HashSet<SessionId> = HashSet::new();

    let by_id: HashMap<SessionId, &Session> = previous.iter().map(|s| (s.id(), s)).collect();

    for session in previous {
        let id = session.id();
        if !seen.insert(id.clone()) {
            // duplicate id in the cache; first occurrence wins
            continue;
        }
        match &session.kind {
            SessionKind::Pending { .. } => {
                report.retained.push(id);
                sessions.push(session.clone());
            }
            SessionKind::DocumentBound { document_name } => {
                if documents.contains(document_name) {
                    let mut kept = session.clone();
                    kept.title = document_name.clone();
                    report.retained.push(id);
                    sessions.push(kept);
                } else {
                    report.dropped.push(id);
                }
            }
        }
    }

    for name in documents.iter() {
        let id = SessionId::for_document(name);
        if by_id.contains_key(&id) {
            continue;
        }
        report.created.push(id);
        sessions.push(Session::for_document(name, now));
    }

    let active = repair_active(&sessions, active, documents);

    Reconciliation {
        sessions,
        active,
        report,
    }
}

/// Keeps `active` when it still names a session; otherwise picks the first
/// document's session, then the first remaining session.
fn repair_active(
    sessions: &[Session],
    active: Option<&SessionId>,
    documents: &DocumentSet,
) -> Option<SessionId> {
    if let Some(current) = active
        && sessions.iter().any(|s| &s.id() == current)
    {
        return Some(current.clone());
    }

    documents
        .first()
        .map(SessionId::for_document)
        .or_else(|| sessions.first().map(Session::id))
}
