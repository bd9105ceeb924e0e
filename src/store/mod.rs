//! # Document Store
//!
//! The capability the record lifecycle runs against: a single collection of
//! flat string documents addressed by store-assigned ids.
//!
//! Implementations:
//! - [`InMemoryStore`] - process-local, used by tests and `backend: memory`
//! - [`FirestoreStore`] - hosted Firestore (or its emulator) over REST

pub mod firestore;
pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::credentials::CredentialsError;

pub use firestore::FirestoreStore;
pub use memory::InMemoryStore;

/// A stored document: string keys to string values
pub type Document = BTreeMap<String, String>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with an error status
    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A merge targeted a document that does not exist
    #[error("document not found: {0}")]
    NotFound(String),

    /// The store answered with something we could not read
    #[error("malformed store response: {0}")]
    Decode(String),

    /// No usable access token
    #[error("store authentication failed: {0}")]
    Auth(#[from] CredentialsError),
}

/// Single-collection document store.
///
/// Each method is one round-trip. Per-document atomicity is the store's
/// concern; callers add no locking on top.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document, returning the id the store assigned to it
    async fn put(&self, fields: Document) -> StoreResult<String>;

    /// Every document in the collection, in store order
    async fn stream_all(&self) -> StoreResult<Vec<(String, Document)>>;

    /// Fetch one document; `None` when it does not exist
    async fn get(&self, id: &str) -> StoreResult<Option<Document>>;

    /// Overwrite the given keys of an existing document, leaving others alone.
    /// Fails with [`StoreError::NotFound`] when the document does not exist.
    async fn merge(&self, id: &str, fields: Document) -> StoreResult<()>;

    /// Remove a document. Removing a missing id succeeds.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
