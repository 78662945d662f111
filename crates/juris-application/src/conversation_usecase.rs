//! Conversation use case.
//!
//! Owns the single `ConversationState` and drives every transition on it:
//! reconciliation against the remote directory, the lifecycle operations and
//! the message exchange. Each transition takes the write lock, applies a pure
//! function from `juris_core`, persists the result and releases the lock
//! before any remote call is made.

use crate::outcome::{
    DeleteOutcome, DocumentBindingRequested, PendingSessionCreated, SendOutcome, UploadOutcome,
};
use juris_core::auth::{CredentialStore, UserProfile};
use juris_core::document::{DocumentDirectory, DocumentUpload};
use juris_core::error::{JurisError, Result};
use juris_core::inference::{FALLBACK_REPLY, InferenceClient, format_inference_response};
use juris_core::session::{
    ConversationState, ReconcileReport, ReplyDelivery, Session, SessionCache, SessionId,
};
use juris_core::timestamp::Timestamp;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Use case for the conversation sessions of the signed-in user.
///
/// # Thread Safety
///
/// The state lives behind a `RwLock`; reconciliation passes are serialized by
/// a dedicated `Mutex` so that two overlapping fetches cannot interleave their
/// merges. The inference call runs with no lock held, which is what lets a
/// late reply land in its originating session after the user moved on.
pub struct ConversationUseCase {
    state: Arc<RwLock<ConversationState>>,
    reconcile_lock: Mutex<()>,
    cache: Arc<dyn SessionCache>,
    directory: Arc<dyn DocumentDirectory>,
    inference: Arc<dyn InferenceClient>,
    credentials: Arc<dyn CredentialStore>,
}

impl ConversationUseCase {
    pub fn new(
        cache: Arc<dyn SessionCache>,
        directory: Arc<dyn DocumentDirectory>,
        inference: Arc<dyn InferenceClient>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(ConversationState::new())),
            reconcile_lock: Mutex::new(()),
            cache,
            directory,
            inference,
            credentials,
        }
    }

    /// Replaces the in-memory state with the durable cache contents.
    ///
    /// Returns the number of sessions loaded.
    pub async fn load_cached(&self) -> Result<usize> {
        let cached = self.cache.load().await?;
        let mut state = self.state.write().await;
        *state = ConversationState::from_cached(cached);

        tracing::debug!(
            "[ConversationUseCase] Loaded {} cached sessions, active: {:?}",
            state.sessions().len(),
            state.active_id().map(SessionId::as_str)
        );
        Ok(state.sessions().len())
    }

    // ============================================================================
    // Views
    // ============================================================================

    pub async fn snapshot(&self) -> ConversationState {
        self.state.read().await.clone()
    }

    pub async fn sessions(&self) -> Vec<Session> {
        self.state.read().await.sessions().to_vec()
    }

    pub async fn active_session(&self) -> Option<Session> {
        self.state.read().await.active_session().cloned()
    }

    pub async fn is_in_flight(&self, id: &SessionId) -> bool {
        self.state.read().await.is_in_flight(id)
    }

    pub async fn any_in_flight(&self) -> bool {
        self.state.read().await.any_in_flight()
    }

    /// Profile used to stamp user messages; `None` when signed out or the
    /// stored token does not decode.
    pub async fn author(&self) -> Option<UserProfile> {
        match self.credentials.load().await {
            Ok(Some(credential)) => credential.profile().ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("[ConversationUseCase] Failed to read credential: {}", e);
                None
            }
        }
    }

    // ============================================================================
    // Reconciliation
    // ============================================================================

    /// Fetches the document directory and merges it into the session list.
    ///
    /// # Errors
    ///
    /// - `AuthFailure`: the stored credential was rejected and has been cleared
    /// - `TransientFetchFailure`: the directory could not be listed
    ///
    /// In both cases no session is touched.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let _pass = self.reconcile_lock.lock().await;

        let documents = match self.directory.list().await {
            Ok(documents) => documents,
            Err(e) => return Err(self.fetch_failure(e).await),
        };

        let report = self
            .transition(|state| Ok(state.reconciled(&documents, Timestamp::now())))
            .await?;

        if report.is_noop() {
            tracing::debug!(
                "[ConversationUseCase] Reconciled {} documents, nothing changed",
                documents.len()
            );
        } else {
            tracing::info!(
                "[ConversationUseCase] Reconciled {} documents: {} created, {} retained, {} dropped",
                documents.len(),
                report.created.len(),
                report.retained.len(),
                report.dropped.len()
            );
        }
        if !report.dropped.is_empty() {
            tracing::warn!(
                "[ConversationUseCase] Dropped orphaned sessions: {:?}",
                report.dropped.iter().map(SessionId::as_str).collect::<Vec<_>>()
            );
        }

        Ok(report)
    }

    async fn fetch_failure(&self, error: JurisError) -> JurisError {
        match error {
            JurisError::AuthFailure(_) => {
                tracing::warn!("[ConversationUseCase] Directory rejected credential: {}", error);
                self.forget_credential().await;
                error
            }
            JurisError::TransientFetchFailure(_) => {
                tracing::warn!("[ConversationUseCase] Directory fetch failed: {}", error);
                error
            }
            other => {
                tracing::warn!("[ConversationUseCase] Directory fetch failed: {}", other);
                JurisError::transient_fetch(other.to_string())
            }
        }
    }

    async fn forget_credential(&self) {
        if let Err(e) = self.credentials.clear().await {
            tracing::error!("[ConversationUseCase] Failed to clear credential: {}", e);
        }
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Creates a pending session at the front of the list and activates it.
    pub async fn create_pending_session(&self) -> Result<PendingSessionCreated> {
        let session = self
            .transition(|state| {
                let (next, id) = state.with_pending_session(Timestamp::now());
                let session = next
                    .session(&id)
                    .cloned()
                    .ok_or_else(|| JurisError::internal("pending session vanished"))?;
                Ok((next, session))
            })
            .await?;

        let session_id = session.id();
        tracing::debug!("[ConversationUseCase] Created pending session {}", session_id);

        Ok(PendingSessionCreated {
            session,
            binding_requested: DocumentBindingRequested { session_id },
        })
    }

    /// # Errors
    ///
    /// `NotFound` when no session has `id`; the pointer is unchanged.
    pub async fn set_active_session(&self, id: &SessionId) -> Result<()> {
        self.transition(|state| Ok((state.with_active(id)?, ()))).await?;
        tracing::debug!("[ConversationUseCase] Active session is now {}", id);
        Ok(())
    }

    /// Uploads a document, then reconciles so its session appears.
    ///
    /// A pending session is not rebound to the uploaded document; both
    /// sessions remain.
    ///
    /// # Errors
    ///
    /// `UploadFailure` (or `AuthFailure`) with no local change.
    pub async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadOutcome> {
        let file_name = upload.file_name.clone();

        let message = match self.directory.upload(upload).await {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("[ConversationUseCase] Upload of '{}' failed: {}", file_name, e);
                return Err(self.remote_failure(e, JurisError::upload).await);
            }
        };

        tracing::info!("[ConversationUseCase] Uploaded '{}'", file_name);
        let sync = self.reconcile().await;
        Ok(UploadOutcome { message, sync })
    }

    /// Deletes the remote document named `title` and every session titled
    /// after it, then reconciles.
    ///
    /// # Errors
    ///
    /// `DeletionFailure` (or `AuthFailure`) with no local change.
    pub async fn delete_session(&self, title: &str) -> Result<DeleteOutcome> {
        if let Err(e) = self.directory.delete(title).await {
            tracing::warn!("[ConversationUseCase] Deletion of '{}' failed: {}", title, e);
            return Err(self.remote_failure(e, JurisError::deletion).await);
        }

        let removed = self
            .transition(|state| Ok(state.without_title(title)))
            .await?;

        tracing::info!(
            "[ConversationUseCase] Deleted '{}', removed {} sessions",
            title,
            removed.len()
        );

        let sync = self.reconcile().await;
        Ok(DeleteOutcome { removed, sync })
    }

    /// Keeps auth failures as they are (clearing the credential) and folds
    /// everything else into the operation's own failure variant.
    async fn remote_failure(&self, error: JurisError, wrap: fn(String) -> JurisError) -> JurisError {
        match error {
            JurisError::AuthFailure(_) => {
                self.forget_credential().await;
                error
            }
            JurisError::DeletionFailure(_) | JurisError::UploadFailure(_) => error,
            other => wrap(other.to_string()),
        }
    }

    // ============================================================================
    // Exchange
    // ============================================================================

    /// Sends `raw_text` to the session's document and records both sides.
    ///
    /// Empty input, an unknown session and a session that already awaits a
    /// reply are rejected without any change. Inference failures never
    /// escape: they become the fallback agent message.
    pub async fn send_message(&self, session_id: &SessionId, raw_text: &str) -> SendOutcome {
        let author = self.author().await;

        let ticket = {
            let mut state = self.state.write().await;
            match state.begin_exchange(session_id, raw_text, author.as_ref(), Timestamp::now()) {
                Ok((next, ticket)) => {
                    *state = next;
                    self.persist_best_effort(&state).await;
                    ticket
                }
                Err(rejection) => {
                    tracing::debug!(
                        "[ConversationUseCase] send_message rejected for {}: {:?}",
                        session_id,
                        rejection
                    );
                    return SendOutcome::Rejected(rejection);
                }
            }
        };

        let (reply, inference_failed) =
            match self.inference.query(&ticket.document_name, &ticket.query).await {
                Ok(payload) => (format_inference_response(&payload), false),
                Err(e) => {
                    tracing::warn!(
                        "[ConversationUseCase] Inference failed for {}: {}",
                        ticket.session_id,
                        e
                    );
                    (FALLBACK_REPLY.to_string(), true)
                }
            };

        let delivery = {
            let mut state = self.state.write().await;
            let (next, delivery) =
                state.complete_exchange(&ticket.session_id, &reply, Timestamp::now());
            *state = next;
            match delivery {
                ReplyDelivery::Delivered => self.persist_best_effort(&state).await,
                ReplyDelivery::SessionGone => tracing::info!(
                    "[ConversationUseCase] Session {} is gone, discarding reply",
                    ticket.session_id
                ),
            }
            delivery
        };

        SendOutcome::Completed {
            session_id: ticket.session_id,
            reply,
            inference_failed,
            delivery,
        }
    }

    // ============================================================================
    // Persistence
    // ============================================================================

    /// Applies `f` under the write lock and saves the result. The new state is
    /// committed only once the save succeeded.
    async fn transition<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ConversationState) -> Result<(ConversationState, T)>,
    {
        let mut state = self.state.write().await;
        let (next, value) = f(&*state)?;

        if let Err(e) = self.cache.save(&next.to_cached()).await {
            tracing::error!("[ConversationUseCase] Failed to save sessions: {}", e);
            return Err(e);
        }

        *state = next;
        Ok(value)
    }

    /// Exchange steps are committed regardless of the save outcome so the
    /// conversation on screen never loses a message; the next save catches up.
    async fn persist_best_effort(&self, state: &ConversationState) {
        if let Err(e) = self.cache.save(&state.to_cached()).await {
            tracing::error!("[ConversationUseCase] Failed to save sessions: {}", e);
        }
    }
}
