//! Turns service outcomes into notifications.
//!
//! Each operation produces at most one user-facing notification: a success
//! message for writes, or one localized error message for any failure. The
//! technical detail of a failure is emitted separately as a `tracing` event
//! on the `kafalaty::diagnostics` target.

use shared::NotificationKind;
use std::sync::Arc;

use super::messages::{Messages, Operation};
use super::notifications::{BusyGuard, Notifier};
use crate::domain::errors::{KafalatyError, KafalatyResult};

pub const DIAGNOSTICS_TARGET: &str = "kafalaty::diagnostics";

#[derive(Clone)]
pub struct OperationReporter {
    notifier: Arc<dyn Notifier>,
    messages: Messages,
}

impl OperationReporter {
    pub fn new(notifier: Arc<dyn Notifier>, messages: Messages) -> Self {
        Self { notifier, messages }
    }

    /// Show the busy indicator for `operation` until the guard is dropped
    pub fn busy(&self, operation: Operation) -> BusyGuard<'_> {
        BusyGuard::show(self.notifier.as_ref(), self.messages.busy(operation))
    }

    /// Report the outcome of an operation
    pub fn finish<T>(&self, operation: Operation, result: &KafalatyResult<T>) {
        match result {
            Ok(_) => self.success(operation),
            Err(error) => self.failure(operation, error),
        }
    }

    pub fn success(&self, operation: Operation) {
        if let Some(message) = self.messages.success(operation) {
            self.notifier
                .notify(self.messages.success_title(), message, NotificationKind::Success);
        }
    }

    pub fn failure(&self, operation: Operation, error: &KafalatyError) {
        tracing::warn!(
            target: DIAGNOSTICS_TARGET,
            operation = %operation,
            code = %error.code(),
            detail = %error,
            "operation failed"
        );

        // A partial cascade leaves the system resumable, so it is a warning
        let (title, kind) = match error {
            KafalatyError::PartialFailure(_) => {
                (self.messages.warning_title(), NotificationKind::Warning)
            }
            _ => (self.messages.error_title(), NotificationKind::Error),
        };
        self.notifier.notify(title, &self.messages.error(error), kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{AuthError, StoreError};
    use crate::io::messages::Locale;
    use crate::io::notifications::{NotifierEvent, RecordingNotifier};

    fn reporter() -> (Arc<RecordingNotifier>, OperationReporter) {
        let notifier = Arc::new(RecordingNotifier::new());
        let reporter = OperationReporter::new(notifier.clone(), Messages::new(Locale::English));
        (notifier, reporter)
    }

    #[test]
    fn test_write_success_is_announced() {
        let (notifier, reporter) = reporter();
        reporter.finish(Operation::CreateChild, &Ok(()));

        assert_eq!(
            notifier.notifications(),
            vec![(NotificationKind::Success, "Child added".to_string())]
        );
    }

    #[test]
    fn test_read_success_is_silent() {
        let (notifier, reporter) = reporter();
        reporter.finish(Operation::LoadChildren, &Ok(()));
        assert!(notifier.events().is_empty());
    }

    #[test]
    fn test_one_notification_per_failure() {
        let (notifier, reporter) = reporter();
        let result: KafalatyResult<()> = Err(StoreError::PermissionDenied {
            detail: "rules rejected write".to_string(),
        }
        .into());
        reporter.finish(Operation::CreateKafala, &result);

        assert_eq!(
            notifier.events(),
            vec![NotifierEvent::Notified {
                title: "Error".to_string(),
                message: "Permission problem".to_string(),
                kind: NotificationKind::Error,
            }]
        );
    }

    #[test]
    fn test_busy_is_cleared() {
        let (notifier, reporter) = reporter();
        {
            let _busy = reporter.busy(Operation::Login);
            reporter.failure(Operation::Login, &AuthError::InvalidCredentials.into());
        }
        assert!(notifier.busy_balanced());
    }
}
