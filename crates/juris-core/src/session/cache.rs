//! Durable cache contract.
//!
//! The session list and the active pointer are always loaded and saved
//! together, as one unit, so storage can never hold a pointer to a session it
//! does not also hold.

use super::model::{Session, SessionId};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// The persisted part of the conversation state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedState {
    pub sessions: Vec<Session>,
    pub active: Option<SessionId>,
}

/// An abstract store for the session list and active pointer.
///
/// # Implementation Notes
///
/// - `save` must replace the whole snapshot atomically.
/// - `load` on an empty store returns `CachedState::default()`.
/// - Timestamps must come back as comparable instants, not raw text.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn load(&self) -> Result<CachedState>;

    async fn save(&self, state: &CachedState) -> Result<()>;
}

/// Volatile cache backing `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct InMemorySessionCache {
    state: Mutex<CachedState>,
}

impl InMemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn load(&self) -> Result<CachedState> {
        Ok(self.state.lock().await.clone())
    }

    async fn save(&self, state: &CachedState) -> Result<()> {
        *self.state.lock().await = state.clone();
        Ok(())
    }
}
