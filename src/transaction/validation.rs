//! Checks and normalizes transaction payloads sent by clients.
//!
//! Validation runs in a fixed order and stops at the first problem, so the
//! client is always told about the earliest failing check.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime, macros::format_description};

use super::core::{NewTransaction, TransactionType, round_to_cents};

/// The largest amount a single transaction may have.
pub const MAX_AMOUNT: f64 = 999_999_999.99;

/// The maximum number of characters in a description, before trimming.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// The JSON body for creating a transaction, before validation.
///
/// Fields are kept as raw JSON values so that missing or mistyped fields are
/// reported by [validate_transaction] with a helpful message instead of a
/// generic parse error. `amount` accepts both JSON numbers and numeric strings.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// Text detailing the transaction.
    pub description: Option<Value>,
    /// The value of the transaction, e.g. `12.5` or `"12.5"`.
    pub amount: Option<Value>,
    /// Either "Income" or "Expense".
    pub transaction_type: Option<Value>,
    /// When the transaction ocurred, formatted as YYYY-MM-DD.
    pub transaction_date: Option<Value>,
}

/// The reasons a transaction payload can be rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransactionValidationError {
    /// A required field was missing or null.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The transaction type was not "Income" or "Expense".
    #[error("Invalid transaction_type. Must be one of: Income, Expense")]
    InvalidTransactionType,

    /// The amount was not a finite number or a string containing one.
    #[error("Amount must be a valid number")]
    InvalidAmount,

    /// The amount was zero or negative.
    #[error("Amount must be greater than 0")]
    AmountNotPositive,

    /// The amount was greater than [MAX_AMOUNT].
    #[error("Amount is too large")]
    AmountTooLarge,

    /// The description was not a string.
    #[error("Description must be a string")]
    InvalidDescription,

    /// The description was empty or only whitespace.
    #[error("Description cannot be empty")]
    EmptyDescription,

    /// The description was longer than [MAX_DESCRIPTION_LENGTH] characters.
    #[error("Description must be less than 500 characters")]
    DescriptionTooLong,

    /// The transaction date was not a calendar date in the format YYYY-MM-DD.
    #[error("transaction_date must be a valid date in the format YYYY-MM-DD")]
    InvalidDate,
}

/// Validate `payload` and turn it into a transaction ready to be stored.
///
/// `today` is used when the payload has no transaction date, and `now` is
/// recorded as the creation time.
///
/// # Errors
///
/// Returns the first [TransactionValidationError] found, checking in order:
/// required fields, transaction type, amount, description, and then date.
pub fn validate_transaction(
    payload: TransactionPayload,
    today: Date,
    now: OffsetDateTime,
) -> Result<NewTransaction, TransactionValidationError> {
    let TransactionPayload {
        description,
        amount,
        transaction_type,
        transaction_date,
    } = payload;

    let description = description.ok_or(TransactionValidationError::MissingField("description"))?;
    let amount = amount.ok_or(TransactionValidationError::MissingField("amount"))?;
    let transaction_type = transaction_type.ok_or(TransactionValidationError::MissingField(
        "transaction_type",
    ))?;

    let transaction_type: TransactionType = transaction_type
        .as_str()
        .and_then(|transaction_type| transaction_type.parse().ok())
        .ok_or(TransactionValidationError::InvalidTransactionType)?;

    let amount = parse_amount(&amount).ok_or(TransactionValidationError::InvalidAmount)?;

    // Amounts that round down to zero cents are not positive once stored.
    if round_to_cents(amount) <= 0.0 {
        return Err(TransactionValidationError::AmountNotPositive);
    }

    if amount > MAX_AMOUNT {
        return Err(TransactionValidationError::AmountTooLarge);
    }

    let Value::String(description) = description else {
        return Err(TransactionValidationError::InvalidDescription);
    };

    let trimmed_description = description.trim();

    if trimmed_description.is_empty() {
        return Err(TransactionValidationError::EmptyDescription);
    }

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(TransactionValidationError::DescriptionTooLong);
    }

    let transaction_date = match transaction_date {
        None => today,
        Some(Value::String(date_string)) if date_string.trim().is_empty() => today,
        Some(Value::String(date_string)) => parse_date(date_string.trim())?,
        Some(_) => return Err(TransactionValidationError::InvalidDate),
    };

    Ok(NewTransaction {
        description: trimmed_description.to_owned(),
        amount: round_to_cents(amount),
        transaction_type,
        transaction_date,
        created_at: now,
    })
}

/// Parse a JSON number, or a string containing a number, as a finite float.
fn parse_amount(amount: &Value) -> Option<f64> {
    let amount = match amount {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    amount.is_finite().then_some(amount)
}

/// Parse an ISO 8601 calendar date, e.g. "2025-01-31".
pub fn parse_date(date_string: &str) -> Result<Date, TransactionValidationError> {
    Date::parse(date_string, format_description!("[year]-[month]-[day]"))
        .map_err(|_| TransactionValidationError::InvalidDate)
}
