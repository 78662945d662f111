//! Domain layer of JURIS.
//!
//! Holds the session model, the pure transitions over the conversation
//! state, and the contracts for every outside collaborator (durable cache,
//! remote document directory, inference service, credential store). Nothing
//! here performs I/O.

pub mod auth;
pub mod config;
pub mod document;
pub mod error;
pub mod inference;
pub mod session;
pub mod timestamp;

pub use error::{JurisError, Result};
pub use timestamp::Timestamp;
