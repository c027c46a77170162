use chrono::Utc;
use log::{info, warn};
use shared::{LoginRequest, RegisterRequest};
use std::sync::Arc;

use super::errors::KafalatyResult;
use super::models::Account;
use super::session::{Session, SessionContext};
use super::validation::{validate_login, validate_registration};
use crate::config::KafalatyConfig;
use crate::io::{Operation, OperationReporter};
use crate::storage::documents::{decode, encode};
use crate::storage::{DocumentPath, DocumentStore, IdentityProvider};

/// Service for registration, sign-in and the account profile
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    session: SessionContext,
    reporter: OperationReporter,
    email_domain: String,
    min_password_length: usize,
}

impl AccountService {
    /// Create a new AccountService
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        session: SessionContext,
        reporter: OperationReporter,
        config: &KafalatyConfig,
    ) -> Self {
        Self {
            store,
            identity,
            session,
            reporter,
            email_domain: config.email_domain.clone(),
            min_password_length: config.min_password_length,
        }
    }

    /// Register a new account and sign it in.
    ///
    /// The profile document is written after the identity exists. If that
    /// write fails the account stays signed in and the store error is
    /// returned.
    pub async fn register(&self, request: RegisterRequest) -> KafalatyResult<Account> {
        info!("Registering account: id={}, name={}", request.id, request.name);

        let result = self.try_register(&request).await;
        self.reporter.finish(Operation::Register, &result);
        result
    }

    async fn try_register(&self, request: &RegisterRequest) -> KafalatyResult<Account> {
        let command = validate_registration(request, self.min_password_length)?;
        let _busy = self.reporter.busy(Operation::Register);

        let email = Account::email_for(&command.identifier, &self.email_domain);
        let session = self.identity.register(&email, &command.password).await?;

        let account = Account {
            uid: session.uid.clone(),
            identifier: command.identifier,
            name: command.name,
            email,
            created_at: Utc::now(),
        };

        if let Err(error) = self
            .store
            .set(&DocumentPath::user(&account.uid), encode(&account.to_record())?)
            .await
        {
            warn!("Identity {} created but its profile was not saved: {}", account.uid, error);
            return Err(error.into());
        }

        info!("Registered account {} with uid {}", account.identifier, account.uid);
        Ok(account)
    }

    /// Sign in with a local identifier and password
    pub async fn login(&self, request: LoginRequest) -> KafalatyResult<Session> {
        info!("Signing in: id={}", request.id);

        let result = self.try_login(&request).await;
        self.reporter.finish(Operation::Login, &result);
        result
    }

    async fn try_login(&self, request: &LoginRequest) -> KafalatyResult<Session> {
        let command = validate_login(request)?;
        let _busy = self.reporter.busy(Operation::Login);

        let email = Account::email_for(&command.identifier, &self.email_domain);
        let session = self.identity.login(&email, &command.password).await?;

        info!("Signed in uid {}", session.uid);
        Ok(session)
    }

    /// Sign out. Signing out with no active session does nothing.
    pub async fn logout(&self) -> KafalatyResult<()> {
        let Some(session) = self.session.current() else {
            info!("Logout requested with no active session");
            return Ok(());
        };
        info!("Signing out uid {}", session.uid);

        let result: KafalatyResult<()> = {
            let _busy = self.reporter.busy(Operation::Logout);
            self.identity.logout(&session).await.map_err(Into::into)
        };
        self.reporter.finish(Operation::Logout, &result);
        result
    }

    /// Profile of the signed-in account
    pub async fn current_account(&self) -> KafalatyResult<Account> {
        let result = self.try_current_account().await;
        if let Err(error) = &result {
            self.reporter.failure(Operation::LoadProfile, error);
        }
        result
    }

    async fn try_current_account(&self) -> KafalatyResult<Account> {
        let session = self.session.require()?;
        let document = self.store.get(&DocumentPath::user(&session.uid)).await?;
        Ok(Account::from_record(&session.uid, decode(&document)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{AuthError, Field, KafalatyError, Rule, StoreError, ValidationError};
    use crate::domain::session::SessionState;
    use crate::storage::test_utils::TestEnvironment;
    use crate::storage::CollectionPath;
    use shared::NotificationKind;

    fn register_request(id: &str, name: &str, password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            id: id.to_string(),
            name: name.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn login_request(id: &str, password: &str) -> LoginRequest {
        LoginRequest {
            id: id.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let env = TestEnvironment::new();

        let account = env
            .account_service
            .register(register_request("12345", "Name", "secret1", "secret1"))
            .await
            .expect("Failed to register account");

        assert_eq!(account.identifier, "12345");
        assert_eq!(account.email, "12345@kafalaty.app");
        assert!(env.session.is_authenticated());
        assert_eq!(env.uid(), account.uid);

        // Profile stored under users/{uid}
        assert!(env.memory.contains(&DocumentPath::user(&account.uid)).await);
        let profile = env.account_service.current_account().await.unwrap();
        assert_eq!(profile.name, "Name");
        assert_eq!(profile.email, "12345@kafalaty.app");
    }

    #[tokio::test]
    async fn test_register_mismatch_makes_no_calls() {
        let env = TestEnvironment::new();

        let result = env
            .account_service
            .register(register_request("12345", "Name", "abc", "xyz"))
            .await;

        assert_eq!(
            result.unwrap_err(),
            KafalatyError::Validation(ValidationError::new(Field::Password, Rule::Mismatch))
        );
        assert_eq!(env.store.calls(), 0);
        assert_eq!(env.identity.account_count().await, 0);
        assert!(!env.session.is_authenticated());

        assert_eq!(
            env.notifier.notifications(),
            vec![(NotificationKind::Error, "كلمتا المرور غير متطابقتين".to_string())]
        );
        assert!(env.notifier.busy_balanced());
    }

    #[tokio::test]
    async fn test_register_rejects_each_missing_field() {
        let env = TestEnvironment::new();
        let cases = [
            (register_request("", "Name", "secret1", "secret1"), Field::Identifier, Rule::Required),
            (register_request("12345", "  ", "secret1", "secret1"), Field::Name, Rule::Required),
            (register_request("12345", "Name", "", ""), Field::Password, Rule::Required),
            (register_request("12345", "Name", "abc", "abc"), Field::Password, Rule::TooShort { min: 6 }),
        ];

        for (request, field, rule) in cases {
            let error = env.account_service.register(request).await.unwrap_err();
            assert_eq!(error, KafalatyError::Validation(ValidationError::new(field, rule)));
        }
        assert_eq!(env.identity.account_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_identifier() {
        let env = TestEnvironment::signed_in().await;
        env.account_service.logout().await.unwrap();

        let result = env
            .account_service
            .register(register_request("12345", "Other", "secret2", "secret2"))
            .await;

        assert_eq!(result.unwrap_err(), KafalatyError::Auth(AuthError::EmailTaken));
        assert!(!env.session.is_authenticated());
        assert_eq!(
            env.notifier.notifications().last().cloned(),
            Some((NotificationKind::Error, "رقم الهوية مسجل مسبقاً".to_string()))
        );
    }

    #[tokio::test]
    async fn test_profile_write_failure_is_reported() {
        let env = TestEnvironment::new();
        env.store.fail_sets();

        let result = env
            .account_service
            .register(register_request("12345", "Name", "secret1", "secret1"))
            .await;

        assert!(matches!(result, Err(KafalatyError::Store(StoreError::Transient { .. }))));
        assert!(env.session.is_authenticated());
        assert_eq!(env.memory.count(&CollectionPath::users()).await, 0);
    }

    #[tokio::test]
    async fn test_login_state_machine() {
        let env = TestEnvironment::signed_in().await;
        let uid = env.uid();

        env.account_service.logout().await.unwrap();
        assert_eq!(env.session.state(), SessionState::Unauthenticated);

        let wrong = env.account_service.login(login_request("12345", "wrong-pass")).await;
        assert_eq!(wrong.unwrap_err(), KafalatyError::Auth(AuthError::InvalidCredentials));
        assert!(!env.session.is_authenticated());

        let session = env
            .account_service
            .login(login_request("12345", "secret1"))
            .await
            .expect("Failed to sign in");
        assert_eq!(session.uid, uid);
        assert_eq!(env.session.state(), SessionState::Authenticated(session));
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let env = TestEnvironment::new();

        let result = env.account_service.login(login_request(" ", "secret1")).await;
        assert_eq!(
            result.unwrap_err(),
            KafalatyError::Validation(ValidationError::new(Field::Identifier, Rule::Required))
        );
    }

    #[tokio::test]
    async fn test_provider_invalidation_ends_session() {
        let env = TestEnvironment::signed_in().await;

        env.identity.invalidate_session();
        assert!(!env.session.is_authenticated());
        assert_eq!(
            env.account_service.current_account().await.unwrap_err(),
            KafalatyError::Auth(AuthError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_logout_without_session() {
        let env = TestEnvironment::new();
        assert!(env.account_service.logout().await.is_ok());
        assert!(env.notifier.events().is_empty());
    }
}
