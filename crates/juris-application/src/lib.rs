//! Application layer for JURIS.
//!
//! Use cases that drive the domain transitions against the outside
//! collaborators: the durable cache, the remote document directory, the
//! inference service and the credential store.

pub mod auth_usecase;
pub mod conversation_usecase;
pub mod outcome;

pub use auth_usecase::AuthUseCase;
pub use conversation_usecase::ConversationUseCase;
pub use outcome::{
    DeleteOutcome, DocumentBindingRequested, PendingSessionCreated, SendOutcome, UploadOutcome,
};
