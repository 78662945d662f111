//! Conversation use case tests with in-memory collaborators.

use async_trait::async_trait;
use juris_application::{ConversationUseCase, SendOutcome};
use juris_core::JurisError;
use juris_core::auth::{Credential, CredentialStore};
use juris_core::document::{DocumentDirectory, DocumentSet, DocumentUpload};
use juris_core::error::Result;
use juris_core::inference::{FALLBACK_REPLY, InferenceClient};
use juris_core::session::{
    CachedState, EMPTY_DOCUMENT_PREVIEW, ExchangeRejection, InMemorySessionCache, Message,
    ReplyDelivery, Session, SessionCache, SessionId,
};
use juris_core::timestamp::Timestamp;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// {"sub":"jane@example.com","name":"Jane Doe","picture":"https://img/jane.png"}
const JANE_TOKEN: &str = "e30.eyJzdWIiOiJqYW5lQGV4YW1wbGUuY29tIiwibmFtZSI6IkphbmUgRG9lIiwicGljdHVyZSI6Imh0dHBzOi8vaW1nL2phbmUucG5nIn0.sig";

// ============================================================================
// Doubles
// ============================================================================

#[derive(Default)]
struct FakeDirectory {
    documents: Mutex<Vec<String>>,
    list_error: Mutex<Option<JurisError>>,
    delete_error: Mutex<Option<JurisError>>,
    upload_error: Mutex<Option<JurisError>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeDirectory {
    fn with_documents(names: &[&str]) -> Self {
        let directory = Self::default();
        *directory.documents.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
        directory
    }

    fn set_documents(&self, names: &[&str]) {
        *self.documents.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
    }

    fn fail_list(&self, error: JurisError) {
        *self.list_error.lock().unwrap() = Some(error);
    }
}

#[async_trait]
impl DocumentDirectory for FakeDirectory {
    async fn list(&self) -> Result<DocumentSet> {
        if let Some(e) = self.list_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(self.documents.lock().unwrap().iter().cloned().collect())
    }

    async fn delete(&self, document_name: &str) -> Result<()> {
        if let Some(e) = self.delete_error.lock().unwrap().clone() {
            return Err(e);
        }
        self.documents.lock().unwrap().retain(|d| d != document_name);
        self.deleted.lock().unwrap().push(document_name.to_string());
        Ok(())
    }

    async fn upload(&self, upload: DocumentUpload) -> Result<String> {
        if let Some(e) = self.upload_error.lock().unwrap().clone() {
            return Err(e);
        }
        self.documents.lock().unwrap().push(upload.file_name.clone());
        Ok(format!("{} uploaded", upload.file_name))
    }
}

/// Answers from a queue; optionally waits on a gate before answering.
#[derive(Default)]
struct ScriptedInference {
    answers: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<(String, String)>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedInference {
    fn answering(answers: Vec<Result<Value>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            ..Self::default()
        }
    }

    fn gated(answers: Vec<Result<Value>>, gate: Arc<Notify>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            gate: Some(gate),
            ..Self::default()
        }
    }
}

#[async_trait]
impl InferenceClient for ScriptedInference {
    async fn query(&self, document_name: &str, text: &str) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((document_name.to_string(), text.to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(JurisError::inference("no scripted answer")))
    }
}

/// Credential store held in memory.
#[derive(Default)]
struct MemoryCredentials {
    credential: Mutex<Option<Credential>>,
}

impl MemoryCredentials {
    fn signed_in(token: &str) -> Self {
        Self {
            credential: Mutex::new(Some(Credential::new(token))),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentials {
    async fn load(&self) -> Result<Option<Credential>> {
        Ok(self.credential.lock().unwrap().clone())
    }

    async fn store(&self, credential: &Credential) -> Result<()> {
        *self.credential.lock().unwrap() = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.credential.lock().unwrap() = None;
        Ok(())
    }
}

struct FailingCache;

#[async_trait]
impl SessionCache for FailingCache {
    async fn load(&self) -> Result<CachedState> {
        Ok(CachedState::default())
    }

    async fn save(&self, _state: &CachedState) -> Result<()> {
        Err(JurisError::io("disk full"))
    }
}

struct Harness {
    usecase: Arc<ConversationUseCase>,
    cache: Arc<InMemorySessionCache>,
    directory: Arc<FakeDirectory>,
    inference: Arc<ScriptedInference>,
    credentials: Arc<MemoryCredentials>,
}

async fn harness(cached: CachedState, directory: FakeDirectory, inference: ScriptedInference) -> Harness {
    let cache = Arc::new(InMemorySessionCache::new());
    cache.save(&cached).await.unwrap();
    let directory = Arc::new(directory);
    let inference = Arc::new(inference);
    let credentials = Arc::new(MemoryCredentials::signed_in(JANE_TOKEN));

    let usecase = Arc::new(ConversationUseCase::new(
        cache.clone(),
        directory.clone(),
        inference.clone(),
        credentials.clone(),
    ));
    usecase.load_cached().await.unwrap();

    Harness {
        usecase,
        cache,
        directory,
        inference,
        credentials,
    }
}

fn ts(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis).unwrap()
}

fn doc_id(name: &str) -> SessionId {
    SessionId::for_document(name)
}

fn session_with_history(name: &str) -> Session {
    let mut session = Session::for_document(name, ts(1_000));
    session.append(Message::user("Is it covered?", ts(2_000), None, None));
    session.append(Message::agent("Decision: approved\n", ts(3_000)));
    session
}

fn decision() -> Value {
    json!({
        "decision": "approved",
        "amount": 50000,
        "justification": [{"clause": "4.2", "reason": "covered procedure"}]
    })
}

async fn wait_until_in_flight(usecase: &ConversationUseCase, id: &SessionId) {
    for _ in 0..200 {
        if usecase.is_in_flight(id).await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("exchange for {id} never started");
}

// ============================================================================
// Reconciliation
// ============================================================================

mod reconcile_tests {
    use super::*;

    #[tokio::test]
    async fn test_new_document_gets_empty_session() {
        let h = harness(
            CachedState::default(),
            FakeDirectory::with_documents(&["policy_a.pdf"]),
            ScriptedInference::default(),
        )
        .await;

        let report = h.usecase.reconcile().await.unwrap();

        assert_eq!(report.created, vec![doc_id("policy_a.pdf")]);
        let sessions = h.usecase.sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id(), doc_id("policy_a.pdf"));
        assert_eq!(sessions[0].message_count, 0);
        assert_eq!(sessions[0].last_message_preview, EMPTY_DOCUMENT_PREVIEW);
        assert_eq!(
            h.usecase.active_session().await.map(|s| s.id()),
            Some(doc_id("policy_a.pdf"))
        );

        let saved = h.cache.load().await.unwrap();
        assert_eq!(saved.sessions, sessions);
        assert_eq!(saved.active, Some(doc_id("policy_a.pdf")));
    }

    #[tokio::test]
    async fn test_orphaned_session_is_dropped_with_history() {
        let cached = CachedState {
            active: Some(doc_id("policy_a.pdf")),
            sessions: vec![session_with_history("policy_a.pdf")],
        };
        let h = harness(cached, FakeDirectory::default(), ScriptedInference::default()).await;

        let report = h.usecase.reconcile().await.unwrap();

        assert_eq!(report.dropped, vec![doc_id("policy_a.pdf")]);
        assert!(h.usecase.sessions().await.is_empty());
        assert!(h.usecase.active_session().await.is_none());
        assert_eq!(h.cache.load().await.unwrap(), CachedState::default());
    }

    #[tokio::test]
    async fn test_pending_and_retained_sessions_survive() {
        let pending = Session::pending(ts(5_000));
        let cached = CachedState {
            active: Some(pending.id()),
            sessions: vec![pending.clone(), session_with_history("a.pdf")],
        };
        let h = harness(
            cached,
            FakeDirectory::with_documents(&["a.pdf", "b.pdf"]),
            ScriptedInference::default(),
        )
        .await;

        h.usecase.reconcile().await.unwrap();
        let again = h.usecase.reconcile().await.unwrap();

        let sessions = h.usecase.sessions().await;
        let ids: Vec<_> = sessions.iter().map(Session::id).collect();
        assert_eq!(ids, vec![pending.id(), doc_id("a.pdf"), doc_id("b.pdf")]);
        assert_eq!(sessions[1].message_count, 2);
        assert!(again.is_noop());
        assert_eq!(h.usecase.active_session().await.map(|s| s.id()), Some(pending.id()));
    }

    #[tokio::test]
    async fn test_transient_failure_leaves_everything_untouched() {
        let cached = CachedState {
            active: Some(doc_id("a.pdf")),
            sessions: vec![session_with_history("a.pdf")],
        };
        let h = harness(cached.clone(), FakeDirectory::default(), ScriptedInference::default()).await;
        h.directory.fail_list(JurisError::transient_fetch("connection refused"));

        let err = h.usecase.reconcile().await.unwrap_err();

        assert!(err.is_transient_fetch_failure());
        assert_eq!(h.usecase.sessions().await, cached.sessions);
        assert_eq!(h.cache.load().await.unwrap(), cached);
        assert!(h.credentials.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unexpected_list_error_is_reported_as_transient() {
        let h = harness(CachedState::default(), FakeDirectory::default(), ScriptedInference::default()).await;
        h.directory.fail_list(JurisError::internal("bad gateway"));

        assert!(h.usecase.reconcile().await.unwrap_err().is_transient_fetch_failure());
    }

    #[tokio::test]
    async fn test_auth_failure_clears_credential_only() {
        let cached = CachedState {
            active: Some(doc_id("a.pdf")),
            sessions: vec![session_with_history("a.pdf")],
        };
        let h = harness(cached.clone(), FakeDirectory::default(), ScriptedInference::default()).await;
        h.directory.fail_list(JurisError::auth("401 Unauthorized: Token expired"));

        let err = h.usecase.reconcile().await.unwrap_err();

        assert!(err.is_auth_failure());
        assert!(h.credentials.load().await.unwrap().is_none());
        assert_eq!(h.usecase.sessions().await, cached.sessions);
        assert_eq!(h.cache.load().await.unwrap(), cached);
    }
}

// ============================================================================
// Exchange
// ============================================================================

mod exchange_tests {
    use super::*;

    async fn single_document(inference: ScriptedInference) -> Harness {
        let h = harness(
            CachedState::default(),
            FakeDirectory::with_documents(&["policy_a.pdf"]),
            inference,
        )
        .await;
        h.usecase.reconcile().await.unwrap();
        h
    }

    #[tokio::test]
    async fn test_successful_exchange_appends_both_messages() {
        let h = single_document(ScriptedInference::answering(vec![Ok(decision())])).await;
        let id = doc_id("policy_a.pdf");

        let outcome = h.usecase.send_message(&id, "  Is knee surgery covered?  ").await;

        let expected = "Decision: approved\nAmount: 50000\n\nJustification:\n  1. Clause: 4.2\n     Reason: covered procedure\n";
        assert_eq!(
            outcome,
            SendOutcome::Completed {
                session_id: id.clone(),
                reply: expected.to_string(),
                inference_failed: false,
                delivery: ReplyDelivery::Delivered,
            }
        );

        let calls = h.inference.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("policy_a.pdf".to_string(), "Is knee surgery covered?".to_string())]);

        let session = h.usecase.active_session().await.unwrap();
        assert_eq!(session.message_count, 2);
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].content, "Is knee surgery covered?");
        assert_eq!(session.last_message_preview, expected);
        assert!(!h.usecase.any_in_flight().await);

        assert_eq!(h.cache.load().await.unwrap().sessions[0], session);
    }

    #[tokio::test]
    async fn test_user_message_carries_profile() {
        let h = single_document(ScriptedInference::answering(vec![Ok(decision())])).await;

        h.usecase.send_message(&doc_id("policy_a.pdf"), "hello").await;

        let session = h.usecase.active_session().await.unwrap();
        let user = &session.messages[0];
        assert_eq!(user.sender_initials.as_deref(), Some("J"));
        assert_eq!(user.sender_avatar.as_deref(), Some("https://img/jane.png"));
    }

    #[tokio::test]
    async fn test_network_error_becomes_fallback_reply() {
        let h = single_document(ScriptedInference::answering(vec![Err(JurisError::inference(
            "connection reset",
        ))]))
        .await;
        let id = doc_id("policy_a.pdf");

        let outcome = h.usecase.send_message(&id, "Is it covered?").await;

        assert_eq!(outcome.reply(), Some(FALLBACK_REPLY));
        assert!(matches!(outcome, SendOutcome::Completed { inference_failed: true, .. }));
        let session = h.usecase.active_session().await.unwrap();
        assert_eq!(session.message_count, 2);
        assert_eq!(session.messages[1].content, FALLBACK_REPLY);
        assert!(!h.usecase.is_in_flight(&id).await);
    }

    #[tokio::test]
    async fn test_error_payload_is_shown_to_user() {
        let h = single_document(ScriptedInference::answering(vec![Ok(json!({
            "error": "Could not parse model output",
            "raw_output": "{oops"
        }))]))
        .await;

        let outcome = h.usecase.send_message(&doc_id("policy_a.pdf"), "q").await;

        assert_eq!(
            outcome.reply(),
            Some("Error: Could not parse model output\nRaw Output: {oops\n")
        );
    }

    #[tokio::test]
    async fn test_blank_input_and_unknown_session_are_no_ops() {
        let h = single_document(ScriptedInference::default()).await;
        let before = h.cache.load().await.unwrap();

        assert_eq!(
            h.usecase.send_message(&doc_id("policy_a.pdf"), "   \n").await,
            SendOutcome::Rejected(ExchangeRejection::EmptyInput)
        );
        assert_eq!(
            h.usecase.send_message(&doc_id("nope.pdf"), "hello").await,
            SendOutcome::Rejected(ExchangeRejection::UnknownSession)
        );

        assert!(h.inference.calls.lock().unwrap().is_empty());
        assert_eq!(h.cache.load().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_second_send_while_in_flight_is_rejected() {
        let gate = Arc::new(Notify::new());
        let h = single_document(ScriptedInference::gated(vec![Ok(decision())], gate.clone())).await;
        let id = doc_id("policy_a.pdf");

        let usecase = h.usecase.clone();
        let first_id = id.clone();
        let first = tokio::spawn(async move { usecase.send_message(&first_id, "first").await });
        wait_until_in_flight(&h.usecase, &id).await;

        assert_eq!(
            h.usecase.send_message(&id, "second").await,
            SendOutcome::Rejected(ExchangeRejection::AlreadyInFlight)
        );
        let pending = h.usecase.active_session().await.unwrap();
        assert_eq!(pending.message_count, 1);
        assert_eq!(h.cache.load().await.unwrap().sessions[0].message_count, 1);

        gate.notify_one();
        first.await.unwrap();

        let session = h.usecase.active_session().await.unwrap();
        assert_eq!(session.message_count, 2);
        assert_eq!(h.inference.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_late_reply_lands_in_originating_session() {
        let gate = Arc::new(Notify::new());
        let h = harness(
            CachedState::default(),
            FakeDirectory::with_documents(&["a.pdf", "b.pdf"]),
            ScriptedInference::gated(vec![Ok(decision())], gate.clone()),
        )
        .await;
        h.usecase.reconcile().await.unwrap();
        let a = doc_id("a.pdf");
        let b = doc_id("b.pdf");

        let usecase = h.usecase.clone();
        let asked = a.clone();
        let exchange = tokio::spawn(async move { usecase.send_message(&asked, "about a").await });
        wait_until_in_flight(&h.usecase, &a).await;

        h.usecase.set_active_session(&b).await.unwrap();
        gate.notify_one();
        let outcome = exchange.await.unwrap();

        assert!(matches!(outcome, SendOutcome::Completed { ref session_id, .. } if *session_id == a));
        let state = h.usecase.snapshot().await;
        assert_eq!(state.active_id(), Some(&b));
        assert_eq!(state.session(&a).unwrap().message_count, 2);
        assert_eq!(state.session(&b).unwrap().message_count, 0);
    }

    #[tokio::test]
    async fn test_reply_for_deleted_session_is_discarded() {
        let gate = Arc::new(Notify::new());
        let h = harness(
            CachedState::default(),
            FakeDirectory::with_documents(&["a.pdf", "b.pdf"]),
            ScriptedInference::gated(vec![Ok(decision())], gate.clone()),
        )
        .await;
        h.usecase.reconcile().await.unwrap();
        let a = doc_id("a.pdf");

        let usecase = h.usecase.clone();
        let asked = a.clone();
        let exchange = tokio::spawn(async move { usecase.send_message(&asked, "about a").await });
        wait_until_in_flight(&h.usecase, &a).await;

        h.usecase.delete_session("a.pdf").await.unwrap();
        gate.notify_one();
        let outcome = exchange.await.unwrap();

        assert!(matches!(
            outcome,
            SendOutcome::Completed { delivery: ReplyDelivery::SessionGone, .. }
        ));
        let sessions = h.usecase.sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].message_count, 0);
        assert!(!h.usecase.any_in_flight().await);
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pending_session_goes_first_and_requests_binding() {
        let h = harness(
            CachedState::default(),
            FakeDirectory::with_documents(&["a.pdf"]),
            ScriptedInference::default(),
        )
        .await;
        h.usecase.reconcile().await.unwrap();

        let created = h.usecase.create_pending_session().await.unwrap();
        let second = h.usecase.create_pending_session().await.unwrap();

        assert!(created.session.is_pending());
        assert_eq!(created.binding_requested.session_id, created.session.id());
        assert_ne!(created.session.id(), second.session.id());

        let sessions = h.usecase.sessions().await;
        assert_eq!(sessions[0].id(), second.session.id());
        assert_eq!(sessions[1].id(), created.session.id());
        assert_eq!(h.usecase.active_session().await.unwrap().id(), second.session.id());
        assert_eq!(h.cache.load().await.unwrap().active, Some(second.session.id()));
    }

    #[tokio::test]
    async fn test_set_active_session_rejects_unknown_ids() {
        let h = harness(
            CachedState::default(),
            FakeDirectory::with_documents(&["a.pdf", "b.pdf"]),
            ScriptedInference::default(),
        )
        .await;
        h.usecase.reconcile().await.unwrap();

        h.usecase.set_active_session(&doc_id("b.pdf")).await.unwrap();
        let err = h
            .usecase
            .set_active_session(&SessionId::from_raw("doc-ghost.pdf"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(h.usecase.active_session().await.unwrap().id(), doc_id("b.pdf"));
        assert_eq!(h.cache.load().await.unwrap().active, Some(doc_id("b.pdf")));
    }

    #[tokio::test]
    async fn test_delete_removes_matching_sessions_and_repoints() {
        let h = harness(
            CachedState::default(),
            FakeDirectory::with_documents(&["a.pdf", "b.pdf"]),
            ScriptedInference::default(),
        )
        .await;
        h.usecase.reconcile().await.unwrap();
        assert_eq!(h.usecase.active_session().await.unwrap().id(), doc_id("a.pdf"));

        let outcome = h.usecase.delete_session("a.pdf").await.unwrap();

        assert_eq!(outcome.removed, vec![doc_id("a.pdf")]);
        assert!(outcome.sync.is_ok());
        assert_eq!(h.directory.deleted.lock().unwrap().clone(), vec!["a.pdf".to_string()]);
        let ids: Vec<_> = h.usecase.sessions().await.iter().map(Session::id).collect();
        assert_eq!(ids, vec![doc_id("b.pdf")]);
        assert_eq!(h.usecase.active_session().await.unwrap().id(), doc_id("b.pdf"));
    }

    #[tokio::test]
    async fn test_delete_failure_changes_nothing() {
        let cached = CachedState {
            active: Some(doc_id("a.pdf")),
            sessions: vec![session_with_history("a.pdf")],
        };
        let h = harness(
            cached.clone(),
            FakeDirectory::with_documents(&["a.pdf"]),
            ScriptedInference::default(),
        )
        .await;
        *h.directory.delete_error.lock().unwrap() = Some(JurisError::io("connection reset"));

        let err = h.usecase.delete_session("a.pdf").await.unwrap_err();

        assert!(matches!(err, JurisError::DeletionFailure(_)));
        assert_eq!(h.usecase.sessions().await, cached.sessions);
        assert_eq!(h.cache.load().await.unwrap(), cached);
    }

    #[tokio::test]
    async fn test_upload_reconciles_and_keeps_pending_session() {
        let h = harness(CachedState::default(), FakeDirectory::default(), ScriptedInference::default()).await;
        let pending = h.usecase.create_pending_session().await.unwrap();

        let outcome = h
            .usecase
            .upload_document(DocumentUpload::new("policy_c.pdf", b"%PDF".to_vec()))
            .await
            .unwrap();

        assert_eq!(outcome.message, "policy_c.pdf uploaded");
        assert_eq!(outcome.sync.unwrap().created, vec![doc_id("policy_c.pdf")]);
        let ids: Vec<_> = h.usecase.sessions().await.iter().map(Session::id).collect();
        assert_eq!(ids, vec![pending.session.id(), doc_id("policy_c.pdf")]);
        assert_eq!(h.usecase.active_session().await.unwrap().id(), pending.session.id());
    }

    #[tokio::test]
    async fn test_upload_failure_changes_nothing() {
        let h = harness(
            CachedState::default(),
            FakeDirectory::with_documents(&["a.pdf"]),
            ScriptedInference::default(),
        )
        .await;
        h.usecase.reconcile().await.unwrap();
        let before = h.cache.load().await.unwrap();
        *h.directory.upload_error.lock().unwrap() =
            Some(JurisError::upload("400 Bad Request: Only PDF files are allowed"));

        let err = h
            .usecase
            .upload_document(DocumentUpload::new("notes.txt", b"hi".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err, JurisError::UploadFailure(ref m) if m.contains("Only PDF")));
        assert_eq!(h.cache.load().await.unwrap(), before);
        assert_eq!(h.usecase.sessions().await, before.sessions);
    }

    #[tokio::test]
    async fn test_auth_rejection_on_upload_clears_credential() {
        let h = harness(CachedState::default(), FakeDirectory::default(), ScriptedInference::default()).await;
        *h.directory.upload_error.lock().unwrap() = Some(JurisError::auth("403 Forbidden"));

        let err = h
            .usecase
            .upload_document(DocumentUpload::new("a.pdf", Vec::new()))
            .await
            .unwrap_err();

        assert!(err.is_auth_failure());
        assert!(h.credentials.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_save_does_not_commit_transition() {
        let usecase = ConversationUseCase::new(
            Arc::new(FailingCache),
            Arc::new(FakeDirectory::with_documents(&["a.pdf"])),
            Arc::new(ScriptedInference::default()),
            Arc::new(MemoryCredentials::default()),
        );

        let err = usecase.create_pending_session().await.unwrap_err();

        assert!(matches!(err, JurisError::Io { .. }));
        assert!(usecase.sessions().await.is_empty());
        assert!(usecase.reconcile().await.is_err());
        assert!(usecase.sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_document_removed_remotely_disappears_on_next_pass() {
        let h = harness(
            CachedState::default(),
            FakeDirectory::with_documents(&["a.pdf", "b.pdf"]),
            ScriptedInference::default(),
        )
        .await;
        h.usecase.reconcile().await.unwrap();

        h.directory.set_documents(&["b.pdf"]);
        let report = h.usecase.reconcile().await.unwrap();

        assert_eq!(report.dropped, vec![doc_id("a.pdf")]);
        assert_eq!(h.usecase.active_session().await.unwrap().id(), doc_id("b.pdf"));
    }
}
