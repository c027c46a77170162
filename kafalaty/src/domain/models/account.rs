//! kafalaty/src/domain/models/account.rs

use chrono::{DateTime, Utc};
use shared::AccountRecord;

use super::{format_timestamp, parse_timestamp};
use crate::domain::errors::StoreError;

/// A registered guardian account
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Opaque user reference issued by the identity provider
    pub uid: String,
    /// Locally chosen identifier the email is derived from
    pub identifier: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Derive the identity provider email for a local identifier
    pub fn email_for(identifier: &str, email_domain: &str) -> String {
        format!("{}@{}", identifier, email_domain)
    }

    pub fn to_record(&self) -> AccountRecord {
        AccountRecord {
            id: self.identifier.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: format_timestamp(&self.created_at),
        }
    }

    pub fn from_record(uid: &str, record: AccountRecord) -> Result<Self, StoreError> {
        Ok(Self {
            uid: uid.to_string(),
            identifier: record.id,
            name: record.name,
            email: record.email,
            created_at: parse_timestamp(&record.created_at)?,
        })
    }
}
