//! Domain-level command types.
//!
//! Validation turns the raw request DTOs from the `shared` crate into these
//! structs; services only ever act on a command, never on raw input.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::Currency;

/// Validated registration input
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterCommand {
    pub identifier: String,
    pub name: String,
    pub password: String,
}

/// Validated login input
#[derive(Debug, Clone, PartialEq)]
pub struct LoginCommand {
    pub identifier: String,
    pub password: String,
}

/// Validated input for creating a child
#[derive(Debug, Clone, PartialEq)]
pub struct CreateChildCommand {
    pub name: String,
    pub age: u32,
}

/// Validated input for recording a kafala
#[derive(Debug, Clone, PartialEq)]
pub struct CreateKafalaCommand {
    pub organization: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub date: NaiveDate,
    pub notes: Option<String>,
}
