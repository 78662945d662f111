//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: `Session`, `SessionKind` and `SessionId`
//! - `message`: `Message` and `Sender`
//! - `cache`: durable cache contract (`SessionCache`)
//! - `reconcile`: merge of cached sessions with the remote document set
//! - `state`: `ConversationState` and its pure transitions

mod cache;
mod message;
mod model;
mod reconcile;
mod state;

pub use cache::{CachedState, InMemorySessionCache, SessionCache};
pub use message::{Message, Sender};
pub use model::{
    DOCUMENT_SESSION_PREFIX, EMPTY_DOCUMENT_PREVIEW, PENDING_SESSION_PREFIX,
    PENDING_SESSION_TITLE, Session, SessionId, SessionKind,
};
pub use reconcile::{ReconcileReport, Reconciliation, reconcile};
pub use state::{ConversationState, ExchangeRejection, ExchangeTicket, ReplyDelivery};
