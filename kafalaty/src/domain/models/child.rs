//! kafalaty/src/domain/models/child.rs

use chrono::{DateTime, Utc};
use shared::{ChildRecord, KafalaSummary};

use super::{format_timestamp, parse_timestamp};
use crate::domain::errors::StoreError;

/// A child under the care of one account
#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    pub id: String,
    /// uid of the owning account
    pub owner_uid: String,
    pub name: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
}

impl Child {
    pub fn to_record(&self) -> ChildRecord {
        ChildRecord {
            name: self.name.clone(),
            age: self.age,
            created_at: format_timestamp(&self.created_at),
        }
    }

    pub fn from_record(owner_uid: &str, id: &str, record: ChildRecord) -> Result<Self, StoreError> {
        Ok(Self {
            id: id.to_string(),
            owner_uid: owner_uid.to_string(),
            name: record.name,
            age: record.age,
            created_at: parse_timestamp(&record.created_at)?,
        })
    }
}

/// A child together with the per-currency totals of its kafalas
#[derive(Debug, Clone, PartialEq)]
pub struct ChildOverview {
    pub child: Child,
    pub summary: KafalaSummary,
}
