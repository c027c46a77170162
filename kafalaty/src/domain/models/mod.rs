//! Domain models for accounts, children and kafalas.
//!
//! Each model knows how to convert to and from its stored record in the
//! `shared` crate. Conversion from a record can fail when a stored document
//! carries a malformed timestamp or date; that surfaces as a store error.

pub mod account;
pub mod child;
pub mod kafala;

pub use account::Account;
pub use child::{Child, ChildOverview};
pub use kafala::Kafala;

use chrono::{DateTime, Utc};

use super::errors::StoreError;

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::unknown(format!("malformed createdAt '{}': {}", value, e)))
}

pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
