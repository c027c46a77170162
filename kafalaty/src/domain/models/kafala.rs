//! kafalaty/src/domain/models/kafala.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{Currency, KafalaRecord};

use super::{format_timestamp, parse_timestamp};
use crate::domain::errors::StoreError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A sponsorship payment recorded for one child
#[derive(Debug, Clone, PartialEq)]
pub struct Kafala {
    pub id: String,
    pub child_id: String,
    pub organization: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Kafala {
    /// Stored form; the currency is always tagged explicitly
    pub fn to_record(&self) -> KafalaRecord {
        KafalaRecord {
            organization: self.organization.clone(),
            amount: self.amount,
            currency: Some(self.currency.code().to_string()),
            date: self.date.format(DATE_FORMAT).to_string(),
            notes: self.notes.clone(),
            created_at: format_timestamp(&self.created_at),
        }
    }

    /// Build a kafala from its stored record.
    ///
    /// A missing or unrecognized currency tag resolves to ILS.
    pub fn from_record(child_id: &str, id: &str, record: KafalaRecord) -> Result<Self, StoreError> {
        let date = NaiveDate::parse_from_str(&record.date, DATE_FORMAT)
            .map_err(|e| StoreError::unknown(format!("malformed date '{}': {}", record.date, e)))?;

        Ok(Self {
            id: id.to_string(),
            child_id: child_id.to_string(),
            organization: record.organization,
            amount: record.amount,
            currency: Currency::from_tag(record.currency.as_deref()),
            date,
            notes: record.notes,
            created_at: parse_timestamp(&record.created_at)?,
        })
    }
}
