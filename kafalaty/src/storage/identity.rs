//! In-memory identity provider.
//!
//! Accounts are keyed by normalized email. Secrets are never kept in clear:
//! each account stores a random salt and the SHA-256 digest of salt + secret.
//! Session changes are published on a `watch` channel.

use async_trait::async_trait;
use log::{info, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use super::traits::IdentityProvider;
use crate::domain::errors::AuthError;
use crate::domain::session::Session;

/// Minimum secret length the provider accepts
pub const PROVIDER_MIN_SECRET_LENGTH: usize = 6;

struct Credential {
    uid: String,
    salt: String,
    digest: Vec<u8>,
}

fn digest(salt: &str, secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct InMemoryIdentityProvider {
    credentials: Mutex<HashMap<String, Credential>>,
    sessions: watch::Sender<Option<Session>>,
    min_secret_length: usize,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::with_min_secret_length(PROVIDER_MIN_SECRET_LENGTH)
    }

    pub fn with_min_secret_length(min_secret_length: usize) -> Self {
        let (sessions, _) = watch::channel(None);
        Self {
            credentials: Mutex::new(HashMap::new()),
            sessions,
            min_secret_length,
        }
    }

    /// End the current session from the provider side, as when a token
    /// expires or is revoked
    pub fn invalidate_session(&self) {
        if self.publish(None) {
            warn!("Session invalidated by identity provider");
        }
    }

    pub async fn account_count(&self) -> usize {
        self.credentials.lock().await.len()
    }

    fn start_session(&self, uid: &str, email: &str) -> Session {
        let session = Session {
            uid: uid.to_string(),
            email: email.to_string(),
            token: Uuid::new_v4().to_string(),
        };
        self.publish(Some(session.clone()));
        session
    }

    /// Publish a session change; returns whether the value changed
    fn publish(&self, next: Option<Session>) -> bool {
        self.sessions.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        })
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn register(&self, email: &str, secret: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        let mut credentials = self.credentials.lock().await;

        if credentials.contains_key(&email) {
            warn!("Registration rejected, email already in use: {}", email);
            return Err(AuthError::EmailTaken);
        }

        if secret.chars().count() < self.min_secret_length {
            return Err(AuthError::WeakSecret);
        }

        let uid = Uuid::new_v4().simple().to_string();
        let salt = Uuid::new_v4().to_string();
        credentials.insert(
            email.clone(),
            Credential {
                uid: uid.clone(),
                digest: digest(&salt, secret),
                salt,
            },
        );
        drop(credentials);

        info!("Registered identity {} for {}", uid, email);
        Ok(self.start_session(&uid, &email))
    }

    async fn login(&self, email: &str, secret: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        let uid = {
            let credentials = self.credentials.lock().await;
            match credentials.get(&email) {
                Some(credential) if credential.digest == digest(&credential.salt, secret) => {
                    credential.uid.clone()
                }
                _ => return Err(AuthError::InvalidCredentials),
            }
        };

        info!("Signed in {}", email);
        Ok(self.start_session(&uid, &email))
    }

    async fn logout(&self, session: &Session) -> Result<(), AuthError> {
        let is_current = self
            .sessions
            .borrow()
            .as_ref()
            .is_some_and(|current| current.token == session.token);

        if is_current {
            self.publish(None);
            info!("Signed out {}", session.email);
        }
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}
