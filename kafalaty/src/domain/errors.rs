//! Error taxonomy for the data layer.
//!
//! - [`ValidationError`] is raised locally, before any store or identity call.
//! - [`AuthError`] covers the identity provider and the session state machine.
//! - [`StoreError`] covers document store failures.
//! - [`PartialFailure`] reports a cascade delete that stopped between phases.
//!
//! [`KafalatyError`] wraps all four and is what services return.

use std::fmt;
use thiserror::Error;

/// Input field a validation rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Identifier,
    Name,
    Password,
    Age,
    Organization,
    Amount,
    Date,
    Currency,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Identifier => "identifier",
            Field::Name => "name",
            Field::Password => "password",
            Field::Age => "age",
            Field::Organization => "organization",
            Field::Amount => "amount",
            Field::Date => "date",
            Field::Currency => "currency",
        };
        f.write_str(name)
    }
}

/// Validation rule that an input violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Required,
    TooShort { min: usize },
    Mismatch,
    NotANumber,
    Negative,
    NotPositive,
    TooLarge,
    TooPrecise,
    InvalidDate,
    UnknownCurrency,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("required"),
            Rule::TooShort { min } => write!(f, "shorter than {} characters", min),
            Rule::Mismatch => f.write_str("mismatch"),
            Rule::NotANumber => f.write_str("not a number"),
            Rule::Negative => f.write_str("negative"),
            Rule::NotPositive => f.write_str("not positive"),
            Rule::TooLarge => f.write_str("too large"),
            Rule::TooPrecise => f.write_str("too many digits"),
            Rule::InvalidDate => f.write_str("invalid date"),
            Rule::UnknownCurrency => f.write_str("unknown currency"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid {field}: {rule}")]
pub struct ValidationError {
    pub field: Field,
    pub rule: Rule,
}

impl ValidationError {
    pub fn new(field: Field, rule: Rule) -> Self {
        Self { field, rule }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("secret rejected as too weak")]
    WeakSecret,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no authenticated session")]
    Unauthenticated,
    #[error("identity provider error {code}: {message}")]
    Provider { code: String, message: String },
}

impl AuthError {
    /// Stable code for the diagnostic channel
    pub fn code(&self) -> &str {
        match self {
            AuthError::EmailTaken => "auth/email-already-in-use",
            AuthError::WeakSecret => "auth/weak-password",
            AuthError::InvalidCredentials => "auth/invalid-credential",
            AuthError::Unauthenticated => "auth/unauthenticated",
            AuthError::Provider { code, .. } => code.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document not found: {path}")]
    NotFound { path: String },
    #[error("permission denied: {detail}")]
    PermissionDenied { detail: String },
    #[error("store temporarily unavailable: {detail}")]
    Transient { detail: String },
    #[error("store error: {detail}")]
    Unknown { detail: String },
}

impl StoreError {
    pub fn unknown(detail: impl fmt::Display) -> Self {
        StoreError::Unknown {
            detail: detail.to_string(),
        }
    }

    /// Stable code for the diagnostic channel
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not-found",
            StoreError::PermissionDenied { .. } => "permission-denied",
            StoreError::Transient { .. } => "unavailable",
            StoreError::Unknown { .. } => "unknown",
        }
    }
}

/// Compound operation a [`PartialFailure`] interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOperation {
    CascadeDelete,
}

/// Phases of a cascade delete, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CascadePhase {
    /// Deleting every kafala owned by the child
    Contributions,
    /// Deleting the child itself
    Parent,
}

/// A cascade delete that stopped part-way.
///
/// Carries enough to resume from `failed_phase`; deletes are idempotent so
/// re-running a phase is safe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cascade delete of child {child_id} failed during {failed_phase:?}: {source}")]
pub struct PartialFailure {
    pub during: CompoundOperation,
    pub child_id: String,
    pub completed_phase: Option<CascadePhase>,
    pub failed_phase: CascadePhase,
    /// Kafala ids deleted before the failure
    pub deleted: Vec<String>,
    /// Kafala ids still present when the failure happened
    pub remaining: Vec<String>,
    #[source]
    pub source: StoreError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KafalatyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    PartialFailure(#[from] PartialFailure),
}

impl KafalatyError {
    /// Machine-readable code, kept apart from the localized user message
    pub fn code(&self) -> String {
        match self {
            KafalatyError::Validation(e) => format!("validation/{}/{}", e.field, e.rule),
            KafalatyError::Auth(e) => e.code().to_string(),
            KafalatyError::Store(e) => e.code().to_string(),
            KafalatyError::PartialFailure(e) => format!("partial-failure/{}", e.source.code()),
        }
    }
}

pub type KafalatyResult<T> = Result<T, KafalatyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: KafalatyError = ValidationError::new(Field::Password, Rule::Mismatch).into();
        assert_eq!(err.code(), "validation/password/mismatch");

        let err: KafalatyError = AuthError::EmailTaken.into();
        assert_eq!(err.code(), "auth/email-already-in-use");

        let err: KafalatyError = StoreError::Transient { detail: "timeout".into() }.into();
        assert_eq!(err.code(), "unavailable");
    }

    #[test]
    fn test_partial_failure_keeps_source() {
        let failure = PartialFailure {
            during: CompoundOperation::CascadeDelete,
            child_id: "c1".into(),
            completed_phase: None,
            failed_phase: CascadePhase::Contributions,
            deleted: vec!["k1".into()],
            remaining: vec!["k2".into()],
            source: StoreError::Transient { detail: "timeout".into() },
        };

        let message = failure.to_string();
        assert!(message.contains("c1"));
        assert!(message.contains("timeout"));
        assert_eq!(
            std::error::Error::source(&failure).map(|s| s.to_string()),
            Some("store temporarily unavailable: timeout".to_string())
        );
    }
}
