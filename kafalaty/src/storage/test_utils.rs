//! Test helpers shared by the service tests.
//!
//! [`FaultyStore`] wraps the in-memory store, counts the calls made through it
//! and fails chosen operations on demand. [`TestEnvironment`] wires the
//! services against these fakes, the way the application does.

use async_trait::async_trait;
use shared::{CreateChildRequest, RegisterRequest};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::memory::InMemoryDocumentStore;
use super::paths::{CollectionPath, DocumentPath};
use super::traits::{Document, DocumentStore, SortDirection, StoredDocument};
use super::InMemoryIdentityProvider;
use crate::config::KafalatyConfig;
use crate::domain::errors::StoreError;
use crate::domain::models::Child;
use crate::domain::session::SessionContext;
use crate::domain::{AccountService, ChildService, KafalaService};
use crate::io::RecordingNotifier;
use crate::AppState;

fn injected(operation: &str, target: &str) -> StoreError {
    StoreError::Transient {
        detail: format!("injected {} failure at {}", operation, target),
    }
}

/// Document store that counts calls and fails on demand
pub struct FaultyStore {
    inner: Arc<InMemoryDocumentStore>,
    calls: AtomicUsize,
    deletes: AtomicUsize,
    /// Fail the delete with this ordinal, counted from when it was armed
    fail_delete_at: Mutex<Option<usize>>,
    failing_paths: Mutex<Vec<DocumentPath>>,
    fail_lists: AtomicBool,
    fail_sets: AtomicBool,
}

impl FaultyStore {
    pub fn new(inner: Arc<InMemoryDocumentStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            fail_delete_at: Mutex::new(None),
            failing_paths: Mutex::new(Vec::new()),
            fail_lists: AtomicBool::new(false),
            fail_sets: AtomicBool::new(false),
        }
    }

    /// Total calls of any kind
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Delete calls, including failed ones
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Fail the `n`th delete from now (1-based), once
    pub fn fail_nth_delete(&self, n: usize) {
        *self.fail_delete_at.lock().unwrap() = Some(self.deletes() + n);
    }

    /// Fail every delete of `path` until cleared
    pub fn fail_delete_of(&self, path: DocumentPath) {
        self.failing_paths.lock().unwrap().push(path);
    }

    pub fn fail_lists(&self) {
        self.fail_lists.store(true, Ordering::SeqCst);
    }

    pub fn fail_sets(&self) {
        self.fail_sets.store(true, Ordering::SeqCst);
    }

    pub fn clear_failures(&self) {
        *self.fail_delete_at.lock().unwrap() = None;
        self.failing_paths.lock().unwrap().clear();
        self.fail_lists.store(false, Ordering::SeqCst);
        self.fail_sets.store(false, Ordering::SeqCst);
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn create(&self, collection: &CollectionPath, fields: Document) -> Result<String, StoreError> {
        self.record_call();
        self.inner.create(collection, fields).await
    }

    async fn set(&self, document: &DocumentPath, fields: Document) -> Result<(), StoreError> {
        self.record_call();
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(injected("set", &document.to_string()));
        }
        self.inner.set(document, fields).await
    }

    async fn list(
        &self,
        collection: &CollectionPath,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.record_call();
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(injected("list", &collection.to_string()));
        }
        self.inner.list(collection, order_by, direction).await
    }

    async fn get(&self, document: &DocumentPath) -> Result<StoredDocument, StoreError> {
        self.record_call();
        self.inner.get(document).await
    }

    async fn delete(&self, document: &DocumentPath) -> Result<(), StoreError> {
        self.record_call();
        let ordinal = self.deletes.fetch_add(1, Ordering::SeqCst) + 1;

        let armed = {
            let mut fail_at = self.fail_delete_at.lock().unwrap();
            if *fail_at == Some(ordinal) {
                *fail_at = None;
                true
            } else {
                false
            }
        };
        if armed || self.failing_paths.lock().unwrap().contains(document) {
            return Err(injected("delete", &document.to_string()));
        }
        self.inner.delete(document).await
    }
}

/// Services wired against in-memory fakes
pub struct TestEnvironment {
    pub memory: Arc<InMemoryDocumentStore>,
    pub store: Arc<FaultyStore>,
    pub identity: Arc<InMemoryIdentityProvider>,
    pub notifier: Arc<RecordingNotifier>,
    pub session: SessionContext,
    pub account_service: AccountService,
    pub child_service: ChildService,
    pub kafala_service: KafalaService,
}

impl TestEnvironment {
    /// Fresh environment with no account signed in
    pub fn new() -> Self {
        let memory = Arc::new(InMemoryDocumentStore::new());
        let store = Arc::new(FaultyStore::new(memory.clone()));
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let state = AppState::new(
            &KafalatyConfig::default(),
            store.clone(),
            identity.clone(),
            notifier.clone(),
        );

        Self {
            memory,
            store,
            identity,
            notifier,
            session: state.session,
            account_service: state.account_service,
            child_service: state.child_service,
            kafala_service: state.kafala_service,
        }
    }

    /// Environment with account "12345" registered and signed in
    pub async fn signed_in() -> Self {
        let env = Self::new();
        env.register("12345").await;
        env
    }

    async fn register(&self, identifier: &str) {
        self.account_service
            .register(RegisterRequest {
                id: identifier.to_string(),
                name: "Name".to_string(),
                password: "secret1".to_string(),
                confirm_password: "secret1".to_string(),
            })
            .await
            .expect("Failed to register test account");
    }

    /// Sign out and register a different account
    pub async fn switch_account(&self, identifier: &str) {
        self.account_service.logout().await.expect("Failed to sign out");
        self.register(identifier).await;
    }

    /// uid of the signed-in account
    pub fn uid(&self) -> String {
        self.session.require().expect("No account signed in").uid
    }

    pub async fn create_child(&self, name: &str) -> Child {
        self.child_service
            .create_child(CreateChildRequest {
                name: name.to_string(),
                age: "7".to_string(),
            })
            .await
            .expect("Failed to create child")
    }
}
