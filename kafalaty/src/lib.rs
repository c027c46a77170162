//! # Kafalaty
//!
//! Client-side data layer of a kafala (child sponsorship) tracker. Guardians
//! register, add the children under their care and record the kafala
//! contributions each child receives, in ILS, USD or JOD.
//!
//! Persistence and authentication are reached through the
//! [`storage::DocumentStore`] and [`storage::IdentityProvider`] traits, and
//! user feedback through [`io::Notifier`]. [`AppState`] wires the services
//! against any implementation of the three.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

use config::KafalatyConfig;
use domain::{AccountService, ChildService, KafalaService, SessionContext};
use io::{LogNotifier, Messages, Notifier, OperationReporter};
use storage::{DocumentStore, FileDocumentStore, IdentityProvider, InMemoryDocumentStore, InMemoryIdentityProvider};

/// Every service, sharing one store, identity provider and session
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub child_service: ChildService,
    pub kafala_service: KafalaService,
    pub session: SessionContext,
}

impl AppState {
    pub fn new(
        config: &KafalatyConfig,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = SessionContext::new(identity.subscribe());
        let reporter = OperationReporter::new(notifier, Messages::new(config.locale));

        let account_service =
            AccountService::new(store.clone(), identity, session.clone(), reporter.clone(), config);
        let child_service = ChildService::new(store.clone(), session.clone(), reporter.clone());
        let kafala_service = KafalaService::new(store, session.clone(), reporter);

        Self {
            account_service,
            child_service,
            kafala_service,
            session,
        }
    }
}

/// Build the application state from configuration.
///
/// Documents go to a [`FileDocumentStore`] when a data directory is
/// configured and stay in memory otherwise. Notifications are written to the
/// log.
pub async fn initialize_backend(config: &KafalatyConfig) -> Result<AppState> {
    info!("Initializing kafalaty backend");

    let store: Arc<dyn DocumentStore> = match &config.data_directory {
        Some(directory) => {
            info!("Using file store at {:?}", directory);
            let store = FileDocumentStore::open(directory)
                .await
                .with_context(|| format!("Failed to open data directory {:?}", directory))?;
            Arc::new(store)
        }
        None => {
            info!("No data directory configured, keeping documents in memory");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    let identity = Arc::new(InMemoryIdentityProvider::with_min_secret_length(
        config.min_password_length,
    ));

    Ok(AppState::new(config, store, identity, Arc::new(LogNotifier)))
}
