//! # Storage Traits
//!
//! Capability contracts for the two backend collaborators. Services only talk
//! to these traits, so the hosted backend can be swapped for the in-memory or
//! file-backed implementations in this module (or a test double) without
//! touching domain code.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::watch;

use super::paths::{CollectionPath, DocumentPath};
use crate::domain::errors::{AuthError, StoreError};
use crate::domain::session::Session;

/// Field map of a stored document
pub type Document = Map<String, Value>;

/// A document read back from a collection
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Hierarchical document store: collections of documents, where each
/// document may own sub-collections.
///
/// No multi-document transactions are assumed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document under a generated id and return the id
    async fn create(&self, collection: &CollectionPath, fields: Document) -> Result<String, StoreError>;

    /// Write a document at a known path, replacing any previous content
    async fn set(&self, document: &DocumentPath, fields: Document) -> Result<(), StoreError>;

    /// List every document of a collection ordered by one field.
    /// Documents lacking the field come last.
    async fn list(
        &self,
        collection: &CollectionPath,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Read one document; [`StoreError::NotFound`] if it does not exist
    async fn get(&self, document: &DocumentPath) -> Result<StoredDocument, StoreError>;

    /// Delete one document. Deleting a missing document succeeds.
    /// Sub-collections are left untouched.
    async fn delete(&self, document: &DocumentPath) -> Result<(), StoreError>;
}

/// Identity provider keyed by email
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an identity and sign it in
    async fn register(&self, email: &str, secret: &str) -> Result<Session, AuthError>;

    async fn login(&self, email: &str, secret: &str) -> Result<Session, AuthError>;

    async fn logout(&self, session: &Session) -> Result<(), AuthError>;

    /// Subscribe to session changes. The receiver holds the current session
    /// right away and sees one update per change after that.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}
