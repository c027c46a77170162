//! # Storage Module
//!
//! The capability traits for the document store and the identity provider,
//! the path layout of stored documents, and the implementations shipped with
//! the crate.
//!
//! ## Implementations
//!
//! - [`InMemoryDocumentStore`]: map-backed, used by tests and when no data
//!   directory is configured
//! - [`FileDocumentStore`]: one YAML file per document under a data directory
//! - [`InMemoryIdentityProvider`]: salted SHA-256 credentials, sessions
//!   published on a `watch` channel

pub mod documents;
pub mod file;
pub mod identity;
pub mod memory;
pub mod ordering;
pub mod paths;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use file::FileDocumentStore;
pub use identity::InMemoryIdentityProvider;
pub use memory::InMemoryDocumentStore;
pub use paths::{CollectionPath, DocumentPath};
pub use traits::{Document, DocumentStore, IdentityProvider, SortDirection, StoredDocument};
