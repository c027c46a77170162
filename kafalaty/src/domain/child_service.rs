use chrono::Utc;
use futures::future::try_join_all;
use log::{info, warn};
use shared::CreateChildRequest;
use std::sync::Arc;

use super::aggregator::summarize;
use super::cascade::{CascadeDelete, CascadeReport};
use super::errors::{CascadePhase, CompoundOperation, KafalatyError, KafalatyResult, PartialFailure};
use super::kafala_service::fetch_kafalas;
use super::models::{Child, ChildOverview};
use super::session::SessionContext;
use super::validation::validate_child;
use crate::io::{Operation, OperationReporter};
use crate::storage::documents::{decode, encode};
use crate::storage::{CollectionPath, DocumentPath, DocumentStore, SortDirection};

/// Field children are listed by
pub const CHILD_ORDER_FIELD: &str = "createdAt";

/// Service for managing the children of the signed-in account
#[derive(Clone)]
pub struct ChildService {
    store: Arc<dyn DocumentStore>,
    session: SessionContext,
    reporter: OperationReporter,
}

impl ChildService {
    /// Create a new ChildService
    pub fn new(store: Arc<dyn DocumentStore>, session: SessionContext, reporter: OperationReporter) -> Self {
        Self {
            store,
            session,
            reporter,
        }
    }

    /// Create a new child
    pub async fn create_child(&self, request: CreateChildRequest) -> KafalatyResult<Child> {
        info!("Creating child: name={}, age={}", request.name, request.age);

        let result = self.try_create_child(&request).await;
        self.reporter.finish(Operation::CreateChild, &result);
        result
    }

    async fn try_create_child(&self, request: &CreateChildRequest) -> KafalatyResult<Child> {
        let command = validate_child(request)?;
        let session = self.session.require()?;
        let _busy = self.reporter.busy(Operation::CreateChild);

        let mut child = Child {
            id: String::new(),
            owner_uid: session.uid.clone(),
            name: command.name,
            age: command.age,
            created_at: Utc::now(),
        };

        child.id = self
            .store
            .create(&CollectionPath::children(&session.uid), encode(&child.to_record())?)
            .await?;

        info!("Created child: {} with ID: {}", child.name, child.id);
        Ok(child)
    }

    /// Get a child by ID
    pub async fn get_child(&self, child_id: &str) -> KafalatyResult<Child> {
        info!("Getting child: {}", child_id);

        let result = self.try_get_child(child_id).await;
        if let Err(error) = &result {
            warn!("Child {} could not be loaded: {}", child_id, error);
            self.reporter.failure(Operation::LoadChildren, error);
        }
        result
    }

    async fn try_get_child(&self, child_id: &str) -> KafalatyResult<Child> {
        let session = self.session.require()?;
        let document = self.store.get(&DocumentPath::child(&session.uid, child_id)).await?;
        Ok(Child::from_record(&session.uid, &document.id, decode(&document)?)?)
    }

    /// List all children, most recently created first
    pub async fn list_children(&self) -> KafalatyResult<Vec<Child>> {
        info!("Listing all children");

        let result = self.try_list_children().await;
        if let Err(error) = &result {
            self.reporter.failure(Operation::LoadChildren, error);
        }
        result
    }

    async fn try_list_children(&self) -> KafalatyResult<Vec<Child>> {
        let session = self.session.require()?;
        let _busy = self.reporter.busy(Operation::LoadChildren);

        let children = self.fetch_children(&session.uid).await?;
        info!("Found {} children", children.len());
        Ok(children)
    }

    async fn fetch_children(&self, uid: &str) -> KafalatyResult<Vec<Child>> {
        let documents = self
            .store
            .list(&CollectionPath::children(uid), CHILD_ORDER_FIELD, SortDirection::Descending)
            .await?;

        let children = documents
            .iter()
            .map(|document| Child::from_record(uid, &document.id, decode(document)?))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(children)
    }

    /// List all children with the per-currency totals of their kafalas.
    ///
    /// The kafala reads for the children are issued concurrently.
    pub async fn list_children_with_summaries(&self) -> KafalatyResult<Vec<ChildOverview>> {
        info!("Listing children with kafala summaries");

        let result = self.try_list_children_with_summaries().await;
        if let Err(error) = &result {
            self.reporter.failure(Operation::LoadChildren, error);
        }
        result
    }

    async fn try_list_children_with_summaries(&self) -> KafalatyResult<Vec<ChildOverview>> {
        let session = self.session.require()?;
        let _busy = self.reporter.busy(Operation::LoadChildren);

        let children = self.fetch_children(&session.uid).await?;
        let store = self.store.as_ref();
        let uid = session.uid.as_str();

        let overviews = try_join_all(children.into_iter().map(|child| async move {
            let kafalas = fetch_kafalas(store, uid, &child.id).await?;
            Ok::<_, KafalatyError>(ChildOverview {
                summary: summarize(&kafalas),
                child,
            })
        }))
        .await?;

        Ok(overviews)
    }

    /// Delete a child and every kafala it owns.
    ///
    /// Kafalas are deleted first, then the child. If the run stops part-way
    /// the error is a [`PartialFailure`]; pass it to
    /// [`resume_delete_child`](Self::resume_delete_child) to finish the job.
    /// Deleting a child that no longer exists succeeds.
    pub async fn delete_child(&self, child_id: &str) -> KafalatyResult<CascadeReport> {
        info!("Deleting child: {}", child_id);

        let result = self.run_cascade(child_id, CascadePhase::Contributions).await;
        self.reporter.finish(Operation::DeleteChild, &result);
        result
    }

    /// Resume a cascade delete from the phase that failed
    pub async fn resume_delete_child(&self, failure: &PartialFailure) -> KafalatyResult<CascadeReport> {
        info!(
            "Resuming {:?} of child {} at phase {:?}",
            failure.during, failure.child_id, failure.failed_phase
        );

        let result = match failure.during {
            CompoundOperation::CascadeDelete => {
                self.run_cascade(&failure.child_id, failure.failed_phase).await
            }
        };
        self.reporter.finish(Operation::DeleteChild, &result);
        result
    }

    async fn run_cascade(&self, child_id: &str, from: CascadePhase) -> KafalatyResult<CascadeReport> {
        let session = self.session.require()?;
        let _busy = self.reporter.busy(Operation::DeleteChild);

        CascadeDelete::new(self.store.as_ref(), &session.uid, child_id)
            .run(from)
            .await
    }
}
