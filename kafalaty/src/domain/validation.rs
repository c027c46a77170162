//! Input validation for registration, login, children and kafalas.
//!
//! Every check here is a pure function over the raw request strings. Services
//! run them before touching the identity provider or the document store, so a
//! [`ValidationError`] never costs a network call.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{CreateChildRequest, CreateKafalaRequest, Currency, LoginRequest, RegisterRequest};
use std::str::FromStr;

use super::commands::{CreateChildCommand, CreateKafalaCommand, LoginCommand, RegisterCommand};
use super::errors::{Field, Rule, ValidationError};

/// Minimum password length enforced at registration
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest accepted amount. Amounts are stored as JSON numbers (f64), so
/// magnitude and precision are capped to what reads back unchanged.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Most significant digits an amount may carry
pub const MAX_SIGNIFICANT_DIGITS: usize = 15;

fn required(value: &str, field: Field) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, Rule::Required));
    }
    Ok(())
}

/// Validate a registration request.
///
/// Checks run in a fixed order: identifier, name and password must be present,
/// then the confirmation must match, then the password must be long enough.
pub fn validate_registration(
    request: &RegisterRequest,
    min_password_length: usize,
) -> Result<RegisterCommand, ValidationError> {
    let identifier = request.id.trim();
    let name = request.name.trim();

    required(identifier, Field::Identifier)?;
    required(name, Field::Name)?;
    required(&request.password, Field::Password)?;

    if request.password != request.confirm_password {
        return Err(ValidationError::new(Field::Password, Rule::Mismatch));
    }

    if request.password.chars().count() < min_password_length {
        return Err(ValidationError::new(
            Field::Password,
            Rule::TooShort { min: min_password_length },
        ));
    }

    Ok(RegisterCommand {
        identifier: identifier.to_string(),
        name: name.to_string(),
        password: request.password.clone(),
    })
}

/// Validate a login request: identifier and password must be present
pub fn validate_login(request: &LoginRequest) -> Result<LoginCommand, ValidationError> {
    let identifier = request.id.trim();

    required(identifier, Field::Identifier)?;
    required(&request.password, Field::Password)?;

    Ok(LoginCommand {
        identifier: identifier.to_string(),
        password: request.password.clone(),
    })
}

/// Validate a create-child request
pub fn validate_child(request: &CreateChildRequest) -> Result<CreateChildCommand, ValidationError> {
    let name = request.name.trim();
    required(name, Field::Name)?;

    Ok(CreateChildCommand {
        name: name.to_string(),
        age: parse_age(&request.age)?,
    })
}

/// Parse an age input into a non-negative integer
pub fn parse_age(input: &str) -> Result<u32, ValidationError> {
    let input = input.trim();
    required(input, Field::Age)?;

    let age: i64 = input
        .parse()
        .map_err(|_| ValidationError::new(Field::Age, Rule::NotANumber))?;

    if age < 0 {
        return Err(ValidationError::new(Field::Age, Rule::Negative));
    }

    u32::try_from(age).map_err(|_| ValidationError::new(Field::Age, Rule::NotANumber))
}

/// Validate a create-kafala request
pub fn validate_kafala(request: &CreateKafalaRequest) -> Result<CreateKafalaCommand, ValidationError> {
    let organization = request.organization.trim();
    required(organization, Field::Organization)?;

    let amount = parse_amount(&request.amount)?;
    let date = parse_date(&request.date)?;
    let currency = parse_currency(request.currency.as_deref())?;

    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(CreateKafalaCommand {
        organization: organization.to_string(),
        amount,
        currency,
        date,
        notes,
    })
}

/// Parse an amount input into a positive decimal
pub fn parse_amount(input: &str) -> Result<Decimal, ValidationError> {
    let input = input.trim();
    required(input, Field::Amount)?;

    let amount = Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .map_err(|_| ValidationError::new(Field::Amount, Rule::NotANumber))?;

    if amount <= Decimal::ZERO {
        return Err(ValidationError::new(Field::Amount, Rule::NotPositive));
    }

    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(ValidationError::new(Field::Amount, Rule::TooLarge));
    }

    let amount = amount.normalize();
    if amount.mantissa().unsigned_abs().to_string().len() > MAX_SIGNIFICANT_DIGITS {
        return Err(ValidationError::new(Field::Amount, Rule::TooPrecise));
    }

    Ok(amount)
}

/// Parse a calendar date in `YYYY-MM-DD` form
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let input = input.trim();
    required(input, Field::Date)?;

    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| ValidationError::new(Field::Date, Rule::InvalidDate))
}

/// Parse an optional currency code, defaulting to the primary local currency
pub fn parse_currency(input: Option<&str>) -> Result<Currency, ValidationError> {
    match input.map(str::trim) {
        None | Some("") => Ok(Currency::default()),
        Some(code) => code
            .parse()
            .map_err(|_| ValidationError::new(Field::Currency, Rule::UnknownCurrency)),
    }
}
