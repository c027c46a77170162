use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Currencies a kafala can be denominated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// Israeli new shekel, the primary local currency
    #[default]
    ILS,
    /// US dollar
    USD,
    /// Jordanian dinar
    JOD,
}

impl Currency {
    /// Every supported currency, primary local currency first
    pub const ALL: [Currency; 3] = [Currency::ILS, Currency::USD, Currency::JOD];

    /// ISO 4217 code as stored in the `currency` field
    pub fn code(&self) -> &'static str {
        match self {
            Currency::ILS => "ILS",
            Currency::USD => "USD",
            Currency::JOD => "JOD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::ILS => "₪",
            Currency::USD => "$",
            Currency::JOD => "د.أ",
        }
    }

    /// Resolve the currency tag of a stored record.
    ///
    /// Records written before currency tagging existed carry no tag and are
    /// counted as the primary local currency. Unrecognized tags get the same
    /// treatment.
    pub fn from_tag(tag: Option<&str>) -> Currency {
        tag.and_then(|t| t.parse().ok()).unwrap_or_default()
    }

    /// Format an amount for display, e.g. `125.00 ₪`
    pub fn format_amount(&self, amount: Decimal) -> String {
        format!("{:.2} {}", amount, self.symbol())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when a currency code is not one of ILS, USD or JOD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCurrency(pub String);

impl fmt::Display for UnknownCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown currency code: {}", self.0)
    }
}

impl std::error::Error for UnknownCurrency {}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| UnknownCurrency(code.to_string()))
    }
}

/// Stored profile of a registered account (`users/{uid}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Locally chosen identifier the email is derived from
    pub id: String,
    pub name: String,
    pub email: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// Stored child (`users/{uid}/children/{childId}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub name: String,
    pub age: u32,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// Stored kafala (`users/{uid}/children/{childId}/kafalas/{kafalaId}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafalaRecord {
    pub organization: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Currency code; absent on records created before currency tagging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// RFC 3339 timestamp
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub id: String,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChildRequest {
    pub name: String,
    /// Raw age input; must parse to a non-negative integer
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateKafalaRequest {
    pub organization: String,
    /// Raw amount input; must parse to a positive decimal
    pub amount: String,
    /// Currency code; defaults to ILS when absent or empty
    pub currency: Option<String>,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    pub notes: Option<String>,
}

/// Per-currency totals of one child's kafalas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafalaSummary {
    /// Always holds an entry for each of the three currencies
    pub totals: BTreeMap<Currency, Decimal>,
    /// Number of kafalas summed
    pub count: usize,
}

impl KafalaSummary {
    /// All-zero summary
    pub fn empty() -> Self {
        Self {
            totals: Currency::ALL.into_iter().map(|c| (c, Decimal::ZERO)).collect(),
            count: 0,
        }
    }

    pub fn total_for(&self, currency: Currency) -> Decimal {
        self.totals.get(&currency).copied().unwrap_or(Decimal::ZERO)
    }

    /// Currencies with a non-zero total, for display
    pub fn non_zero(&self) -> impl Iterator<Item = (Currency, Decimal)> + '_ {
        self.totals
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(currency, amount)| (*currency, *amount))
    }

    /// Sum of the three sub-totals. Only meaningful as a conservation check;
    /// amounts in different currencies are never added for display.
    /// Saturates at `Decimal::MAX`, like the per-currency totals.
    pub fn sum_of_totals(&self) -> Decimal {
        self.totals
            .values()
            .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(*amount))
    }
}

impl Default for KafalaSummary {
    fn default() -> Self {
        Self::empty()
    }
}

/// Kind of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}
