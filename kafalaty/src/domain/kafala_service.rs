use chrono::Utc;
use log::info;
use shared::{CreateKafalaRequest, KafalaSummary};
use std::sync::Arc;

use super::aggregator::summarize;
use super::commands::CreateKafalaCommand;
use super::errors::{KafalatyResult, StoreError};
use super::models::Kafala;
use super::session::SessionContext;
use super::validation::validate_kafala;
use crate::io::{Operation, OperationReporter};
use crate::storage::documents::{decode, encode};
use crate::storage::{CollectionPath, DocumentPath, DocumentStore, SortDirection};

/// Field kafalas are listed by
pub const KAFALA_ORDER_FIELD: &str = "date";

/// Read every kafala of a child, newest date first
pub(crate) async fn fetch_kafalas(
    store: &dyn DocumentStore,
    uid: &str,
    child_id: &str,
) -> Result<Vec<Kafala>, StoreError> {
    store
        .list(
            &CollectionPath::kafalas(uid, child_id),
            KAFALA_ORDER_FIELD,
            SortDirection::Descending,
        )
        .await?
        .iter()
        .map(|document| Kafala::from_record(child_id, &document.id, decode(document)?))
        .collect()
}

/// Service for recording and reading the kafalas of a child
#[derive(Clone)]
pub struct KafalaService {
    store: Arc<dyn DocumentStore>,
    session: SessionContext,
    reporter: OperationReporter,
}

impl KafalaService {
    pub fn new(store: Arc<dyn DocumentStore>, session: SessionContext, reporter: OperationReporter) -> Self {
        Self {
            store,
            session,
            reporter,
        }
    }

    /// Record a new kafala for a child of the signed-in account
    pub async fn add_kafala(&self, child_id: &str, request: CreateKafalaRequest) -> KafalatyResult<Kafala> {
        info!("Adding kafala for child {}: organization={}", child_id, request.organization);

        let result = self.try_add_kafala(child_id, &request).await;
        self.reporter.finish(Operation::CreateKafala, &result);
        result
    }

    async fn try_add_kafala(&self, child_id: &str, request: &CreateKafalaRequest) -> KafalatyResult<Kafala> {
        let command = validate_kafala(request)?;
        let session = self.session.require()?;
        let _busy = self.reporter.busy(Operation::CreateKafala);

        self.insert(&session.uid, child_id, command).await
    }

    /// Store a validated kafala under an existing child
    async fn insert(&self, uid: &str, child_id: &str, command: CreateKafalaCommand) -> KafalatyResult<Kafala> {
        // A kafala is never written under a child that does not exist
        self.store.get(&DocumentPath::child(uid, child_id)).await?;

        let mut kafala = Kafala {
            id: String::new(),
            child_id: child_id.to_string(),
            organization: command.organization,
            amount: command.amount,
            currency: command.currency,
            date: command.date,
            notes: command.notes,
            created_at: Utc::now(),
        };

        kafala.id = self
            .store
            .create(&CollectionPath::kafalas(uid, child_id), encode(&kafala.to_record())?)
            .await?;

        info!("Added kafala {} ({}) for child {}", kafala.id, kafala.currency.format_amount(kafala.amount), child_id);
        Ok(kafala)
    }

    /// List a child's kafalas ordered by date, newest first
    pub async fn list_kafalas(&self, child_id: &str) -> KafalatyResult<Vec<Kafala>> {
        info!("Listing kafalas for child {}", child_id);

        let result = self.try_list_kafalas(child_id).await;
        if let Err(error) = &result {
            self.reporter.failure(Operation::LoadKafalas, error);
        }
        result
    }

    async fn try_list_kafalas(&self, child_id: &str) -> KafalatyResult<Vec<Kafala>> {
        let session = self.session.require()?;
        let _busy = self.reporter.busy(Operation::LoadKafalas);

        let kafalas = fetch_kafalas(self.store.as_ref(), &session.uid, child_id).await?;
        info!("Found {} kafalas for child {}", kafalas.len(), child_id);
        Ok(kafalas)
    }

    /// Per-currency totals of a child's kafalas
    pub async fn summary_for_child(&self, child_id: &str) -> KafalatyResult<KafalaSummary> {
        let kafalas = self.list_kafalas(child_id).await?;
        Ok(summarize(&kafalas))
    }

    /// Delete one kafala. Deleting a kafala that is already gone succeeds.
    pub async fn delete_kafala(&self, child_id: &str, kafala_id: &str) -> KafalatyResult<()> {
        info!("Deleting kafala {} of child {}", kafala_id, child_id);

        let result = self.try_delete_kafala(child_id, kafala_id).await;
        self.reporter.finish(Operation::DeleteKafala, &result);
        result
    }

    async fn try_delete_kafala(&self, child_id: &str, kafala_id: &str) -> KafalatyResult<()> {
        let session = self.session.require()?;
        let _busy = self.reporter.busy(Operation::DeleteKafala);

        self.store
            .delete(&DocumentPath::kafala(&session.uid, child_id, kafala_id))
            .await?;
        Ok(())
    }

    /// Replace a kafala with new content.
    ///
    /// Kafalas are never edited in place: the new record is created first and
    /// the old one deleted after, so a failure in between leaves the old
    /// record untouched or both present, never neither.
    pub async fn replace_kafala(
        &self,
        child_id: &str,
        kafala_id: &str,
        request: CreateKafalaRequest,
    ) -> KafalatyResult<Kafala> {
        info!("Replacing kafala {} of child {}", kafala_id, child_id);

        let result = self.try_replace_kafala(child_id, kafala_id, &request).await;
        self.reporter.finish(Operation::ReplaceKafala, &result);
        result
    }

    async fn try_replace_kafala(
        &self,
        child_id: &str,
        kafala_id: &str,
        request: &CreateKafalaRequest,
    ) -> KafalatyResult<Kafala> {
        let command = validate_kafala(request)?;
        let session = self.session.require()?;
        let _busy = self.reporter.busy(Operation::ReplaceKafala);

        let old = DocumentPath::kafala(&session.uid, child_id, kafala_id);
        self.store.get(&old).await?;

        let replacement = self.insert(&session.uid, child_id, command).await?;
        self.store.delete(&old).await?;

        info!("Replaced kafala {} with {}", kafala_id, replacement.id);
        Ok(replacement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{AuthError, Field, KafalatyError, Rule};
    use crate::storage::test_utils::TestEnvironment;
    use rust_decimal::Decimal;
    use shared::{Currency, NotificationKind};
    use std::str::FromStr;

    fn request(organization: &str, amount: &str, currency: Option<&str>, date: &str) -> CreateKafalaRequest {
        CreateKafalaRequest {
            organization: organization.to_string(),
            amount: amount.to_string(),
            currency: currency.map(str::to_string),
            date: date.to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_add_and_list_ordered_by_date() {
        let env = TestEnvironment::signed_in().await;
        let child = env.create_child("Sara").await;

        env.kafala_service
            .add_kafala(&child.id, request("Org A", "100", Some("ILS"), "2024-01-10"))
            .await
            .expect("Failed to add kafala");
        env.kafala_service
            .add_kafala(&child.id, request("Org B", "50", Some("USD"), "2024-03-05"))
            .await
            .expect("Failed to add kafala");
        env.kafala_service
            .add_kafala(&child.id, request("Org C", "25", None, "2024-02-01"))
            .await
            .expect("Failed to add kafala");

        let kafalas = env.kafala_service.list_kafalas(&child.id).await.unwrap();
        let organizations: Vec<&str> = kafalas.iter().map(|k| k.organization.as_str()).collect();
        assert_eq!(organizations, vec!["Org B", "Org C", "Org A"]);
        assert_eq!(kafalas[1].currency, Currency::ILS);
    }

    #[tokio::test]
    async fn test_summary_for_child() {
        let env = TestEnvironment::signed_in().await;
        let child = env.create_child("Sara").await;

        for (amount, currency) in [("100", "ILS"), ("50", "USD"), ("25", "ILS")] {
            env.kafala_service
                .add_kafala(&child.id, request("Org", amount, Some(currency), "2024-01-01"))
                .await
                .unwrap();
        }

        let summary = env.kafala_service.summary_for_child(&child.id).await.unwrap();
        assert_eq!(summary.total_for(Currency::ILS), Decimal::from(125));
        assert_eq!(summary.total_for(Currency::USD), Decimal::from(50));
        assert_eq!(summary.total_for(Currency::JOD), Decimal::ZERO);
        assert_eq!(summary.count, 3);
    }

    #[tokio::test]
    async fn test_legacy_document_without_currency() {
        let env = TestEnvironment::signed_in().await;
        let child = env.create_child("Sara").await;
        let uid = env.uid();

        let legacy = serde_json::json!({
            "organization": "Old Org",
            "amount": 40,
            "date": "2022-06-01",
            "createdAt": "2022-06-01T09:00:00.000Z"
        });
        env.store
            .create(
                &CollectionPath::kafalas(&uid, &child.id),
                legacy.as_object().cloned().unwrap(),
            )
            .await
            .unwrap();

        let summary = env.kafala_service.summary_for_child(&child.id).await.unwrap();
        assert_eq!(summary.total_for(Currency::ILS), Decimal::from(40));
        assert_eq!(summary.count, 1);
    }

    #[tokio::test]
    async fn test_validation_error_issues_no_store_call() {
        let env = TestEnvironment::signed_in().await;
        let child = env.create_child("Sara").await;
        let calls_before = env.store.calls();

        let result = env
            .kafala_service
            .add_kafala(&child.id, request("Org", "-3", None, "2024-01-01"))
            .await;

        assert_eq!(
            result.unwrap_err(),
            KafalatyError::Validation(crate::domain::errors::ValidationError::new(
                Field::Amount,
                Rule::NotPositive
            ))
        );
        assert_eq!(env.store.calls(), calls_before);
    }

    #[tokio::test]
    async fn test_amounts_read_back_unchanged() {
        let env = TestEnvironment::signed_in().await;
        let child = env.create_child("Sara").await;

        let mut added = Vec::new();
        for amount in ["999999999999.99", "123456789.123456", "0.1", "1000000000000"] {
            let kafala = env
                .kafala_service
                .add_kafala(&child.id, request("Org", amount, Some("USD"), "2024-01-01"))
                .await
                .expect("Failed to add kafala");
            assert_eq!(kafala.amount, Decimal::from_str(amount).unwrap());
            added.push(kafala);
        }

        let listed = env.kafala_service.list_kafalas(&child.id).await.unwrap();
        assert_eq!(listed.len(), added.len());
        for kafala in &added {
            let stored = listed.iter().find(|k| k.id == kafala.id).expect("kafala missing from list");
            assert_eq!(stored.amount, kafala.amount);
        }
    }

    #[tokio::test]
    async fn test_unstorable_amounts_are_rejected() {
        let env = TestEnvironment::signed_in().await;
        let child = env.create_child("Sara").await;
        let calls_before = env.store.calls();

        for (amount, rule) in [
            ("79228162514264337593543950335", Rule::TooLarge),
            ("12345678901234567.89", Rule::TooLarge),
            ("0.30000000000000001", Rule::TooPrecise),
        ] {
            let result = env
                .kafala_service
                .add_kafala(&child.id, request("Org", amount, None, "2024-01-01"))
                .await;
            assert_eq!(
                result.unwrap_err(),
                KafalatyError::Validation(crate::domain::errors::ValidationError::new(Field::Amount, rule))
            );
        }
        assert_eq!(env.store.calls(), calls_before);

        // The child's kafalas stay readable
        assert!(env.kafala_service.list_kafalas(&child.id).await.unwrap().is_empty());
        assert!(env.child_service.list_children_with_summaries().await.is_ok());
    }

    #[tokio::test]
    async fn test_requires_session() {
        let env = TestEnvironment::new();

        let result = env
            .kafala_service
            .add_kafala("c1", request("Org", "10", None, "2024-01-01"))
            .await;
        assert_eq!(result.unwrap_err(), KafalatyError::Auth(AuthError::Unauthenticated));

        let result = env.kafala_service.list_kafalas("c1").await;
        assert_eq!(result.unwrap_err(), KafalatyError::Auth(AuthError::Unauthenticated));
        assert_eq!(env.store.calls(), 0);
    }

    #[tokio::test]
    async fn test_add_to_missing_child_fails() {
        let env = TestEnvironment::signed_in().await;

        let result = env
            .kafala_service
            .add_kafala("no-such-child", request("Org", "10", None, "2024-01-01"))
            .await;
        assert!(matches!(
            result,
            Err(KafalatyError::Store(StoreError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let env = TestEnvironment::signed_in().await;
        let child = env.create_child("Sara").await;
        let kafala = env
            .kafala_service
            .add_kafala(&child.id, request("Org", "10", None, "2024-01-01"))
            .await
            .unwrap();

        assert!(env.kafala_service.delete_kafala(&child.id, &kafala.id).await.is_ok());
        assert!(env.kafala_service.delete_kafala(&child.id, &kafala.id).await.is_ok());
        assert!(env.kafala_service.delete_kafala(&child.id, "never-existed").await.is_ok());
        assert!(env.kafala_service.list_kafalas(&child.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_kafala() {
        let env = TestEnvironment::signed_in().await;
        let child = env.create_child("Sara").await;
        let original = env
            .kafala_service
            .add_kafala(&child.id, request("Org", "10", None, "2024-01-01"))
            .await
            .unwrap();

        let replacement = env
            .kafala_service
            .replace_kafala(&child.id, &original.id, request("Org", "12.5", Some("JOD"), "2024-01-02"))
            .await
            .unwrap();

        let kafalas = env.kafala_service.list_kafalas(&child.id).await.unwrap();
        assert_eq!(kafalas.len(), 1);
        assert_eq!(kafalas[0].id, replacement.id);
        assert_eq!(kafalas[0].amount, Decimal::from_str("12.5").unwrap());
        assert_eq!(kafalas[0].currency, Currency::JOD);
    }

    #[tokio::test]
    async fn test_success_and_failure_notifications() {
        let env = TestEnvironment::signed_in().await;
        let child = env.create_child("Sara").await;
        env.notifier.clear();

        env.kafala_service
            .add_kafala(&child.id, request("Org", "10", None, "2024-01-01"))
            .await
            .unwrap();
        let _ = env
            .kafala_service
            .add_kafala(&child.id, request("", "10", None, "2024-01-01"))
            .await;

        let kinds: Vec<NotificationKind> = env.notifier.notifications().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![NotificationKind::Success, NotificationKind::Error]);
        assert!(env.notifier.busy_balanced());
    }
}
