//! Two-phase cascade delete of a child.
//!
//! Phase one deletes every kafala of the child, one at a time. Phase two
//! deletes the child document. The store offers no multi-document
//! transactions, so a failure in either phase is reported as a
//! [`PartialFailure`] naming the phase to resume from. Deletes are
//! idempotent, so resuming a phase that had partly run is safe.

use log::{info, warn};

use super::errors::{CascadePhase, CompoundOperation, KafalatyError, PartialFailure};
use super::kafala_service::KAFALA_ORDER_FIELD;
use crate::storage::{CollectionPath, DocumentPath, DocumentStore, SortDirection};

/// Outcome of a completed cascade delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub child_id: String,
    /// Kafalas deleted by this run
    pub kafalas_deleted: usize,
}

pub struct CascadeDelete<'a> {
    store: &'a dyn DocumentStore,
    uid: &'a str,
    child_id: &'a str,
}

impl<'a> CascadeDelete<'a> {
    pub fn new(store: &'a dyn DocumentStore, uid: &'a str, child_id: &'a str) -> Self {
        Self { store, uid, child_id }
    }

    /// Run the cascade starting at `from`
    pub async fn run(&self, from: CascadePhase) -> Result<CascadeReport, KafalatyError> {
        let kafalas_deleted = match from {
            CascadePhase::Contributions => self.delete_kafalas().await?,
            CascadePhase::Parent => 0,
        };

        if let Err(source) = self.store.delete(&DocumentPath::child(self.uid, self.child_id)).await {
            warn!("Deleting child {} failed after its kafalas were removed: {}", self.child_id, source);
            return Err(PartialFailure {
                during: CompoundOperation::CascadeDelete,
                child_id: self.child_id.to_string(),
                completed_phase: Some(CascadePhase::Contributions),
                failed_phase: CascadePhase::Parent,
                deleted: Vec::new(),
                remaining: Vec::new(),
                source,
            }
            .into());
        }

        info!("Deleted child {} and {} kafalas", self.child_id, kafalas_deleted);
        Ok(CascadeReport {
            child_id: self.child_id.to_string(),
            kafalas_deleted,
        })
    }

    async fn delete_kafalas(&self) -> Result<usize, KafalatyError> {
        // Only ids are needed, so malformed kafalas are deleted too.
        // Nothing has been deleted yet if the listing fails.
        let ids: Vec<String> = self
            .store
            .list(
                &CollectionPath::kafalas(self.uid, self.child_id),
                KAFALA_ORDER_FIELD,
                SortDirection::Descending,
            )
            .await?
            .into_iter()
            .map(|document| document.id)
            .collect();

        info!("Deleting {} kafalas of child {}", ids.len(), self.child_id);

        for (index, id) in ids.iter().enumerate() {
            let path = DocumentPath::kafala(self.uid, self.child_id, id);
            if let Err(source) = self.store.delete(&path).await {
                warn!("Cascade delete of child {} stopped at kafala {}: {}", self.child_id, id, source);
                return Err(PartialFailure {
                    during: CompoundOperation::CascadeDelete,
                    child_id: self.child_id.to_string(),
                    completed_phase: None,
                    failed_phase: CascadePhase::Contributions,
                    deleted: ids[..index].to_vec(),
                    remaining: ids[index..].to_vec(),
                    source,
                }
                .into());
            }
        }

        Ok(ids.len())
    }
}
