//! Authentication session state.
//!
//! The identity provider publishes the current session on a `watch` channel.
//! [`SessionContext`] holds the receiving side and is handed to every service,
//! so services read the session from an explicit value instead of a global.
//! Only the provider (driven by register, login and logout) ever writes it.

use tokio::sync::watch;

use super::errors::AuthError;

/// An authenticated account session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque user reference of the authenticated account
    pub uid: String,
    pub email: String,
    /// Opaque token identifying this particular sign-in
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Session),
}

impl From<Option<Session>> for SessionState {
    fn from(session: Option<Session>) -> Self {
        match session {
            Some(session) => SessionState::Authenticated(session),
            None => SessionState::Unauthenticated,
        }
    }
}

/// Read side of the process-wide session
#[derive(Debug, Clone)]
pub struct SessionContext {
    receiver: watch::Receiver<Option<Session>>,
}

impl SessionContext {
    pub fn new(receiver: watch::Receiver<Option<Session>>) -> Self {
        Self { receiver }
    }

    pub fn current(&self) -> Option<Session> {
        self.receiver.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.current().into()
    }

    pub fn is_authenticated(&self) -> bool {
        self.receiver.borrow().is_some()
    }

    /// The current session, or [`AuthError::Unauthenticated`]
    pub fn require(&self) -> Result<Session, AuthError> {
        self.current().ok_or(AuthError::Unauthenticated)
    }

    /// Wait for the next session change.
    ///
    /// Returns `None` once the provider has gone away.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone().into())
    }
}
