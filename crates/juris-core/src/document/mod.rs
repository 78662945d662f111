//! Remote document directory contract.
//!
//! The directory is the only source of truth for which document-bound
//! sessions may exist. Its contents are fetched fresh on every reconciliation.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;

/// Snapshot of the document names available server-side.
///
/// Membership is set-like; iteration order is the order in which the directory
/// returned the names, with duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    names: Vec<String>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn first(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let names = iter
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();
        Self { names }
    }
}

/// A file handed to the directory for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Abstract remote document directory.
///
/// Implementations map transport failures onto
/// [`JurisError::TransientFetchFailure`](crate::JurisError::TransientFetchFailure),
/// [`JurisError::AuthFailure`](crate::JurisError::AuthFailure),
/// [`JurisError::DeletionFailure`](crate::JurisError::DeletionFailure) and
/// [`JurisError::UploadFailure`](crate::JurisError::UploadFailure).
#[async_trait]
pub trait DocumentDirectory: Send + Sync {
    /// Lists the document names currently available.
    async fn list(&self) -> Result<DocumentSet>;

    /// Deletes a document by name.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Uploads a document. Returns the server's confirmation message.
    ///
    /// The new document is observed only through the next [`list`](Self::list).
    async fn upload(&self, upload: DocumentUpload) -> Result<String>;
}
