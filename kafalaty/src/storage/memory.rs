//! In-memory document store.
//!
//! Keeps every collection in a map guarded by an async `RwLock`. Used by the
//! tests and for running without a data directory.

use async_trait::async_trait;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ordering::sort_documents;
use super::paths::{CollectionPath, DocumentPath};
use super::traits::{Document, DocumentStore, SortDirection, StoredDocument};
use crate::domain::errors::StoreError;

#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<CollectionPath, BTreeMap<String, Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents directly inside a collection
    pub async fn count(&self, collection: &CollectionPath) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    pub async fn contains(&self, document: &DocumentPath) -> bool {
        self.collections
            .read()
            .await
            .get(document.collection())
            .is_some_and(|docs| docs.contains_key(document.id()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(&self, collection: &CollectionPath, fields: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .write()
            .await
            .entry(collection.clone())
            .or_default()
            .insert(id.clone(), fields);

        debug!("Created document {}/{}", collection, id);
        Ok(id)
    }

    async fn set(&self, document: &DocumentPath, fields: Document) -> Result<(), StoreError> {
        self.collections
            .write()
            .await
            .entry(document.collection().clone())
            .or_default()
            .insert(document.id().to_string(), fields);

        debug!("Wrote document {}", document);
        Ok(())
    }

    async fn list(
        &self,
        collection: &CollectionPath,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let mut documents: Vec<StoredDocument> = self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        sort_documents(&mut documents, order_by, direction);
        Ok(documents)
    }

    async fn get(&self, document: &DocumentPath) -> Result<StoredDocument, StoreError> {
        self.collections
            .read()
            .await
            .get(document.collection())
            .and_then(|docs| docs.get(document.id()))
            .map(|fields| StoredDocument {
                id: document.id().to_string(),
                fields: fields.clone(),
            })
            .ok_or_else(|| StoreError::NotFound {
                path: document.to_string(),
            })
    }

    async fn delete(&self, document: &DocumentPath) -> Result<(), StoreError> {
        let removed = self
            .collections
            .write()
            .await
            .get_mut(document.collection())
            .and_then(|docs| docs.remove(document.id()));

        if removed.is_none() {
            debug!("Delete of missing document {} ignored", document);
        }
        Ok(())
    }
}
