//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{DatabaseId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction earned or spent money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// Every valid transaction type, in the order they are listed to clients.
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    /// The name of the transaction type as it is stored and sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when a string does not name a [TransactionType].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction type \"{0}\"")]
pub struct UnknownTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    /// Parse a transaction type.
    ///
    /// Matching is exact, "income" is not a valid transaction type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|transaction_type| transaction_type.as_str() == s)
            .ok_or_else(|| UnknownTransactionType(s.to_owned()))
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: UnknownTransactionType| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions cannot be edited once created, only deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned, always positive.
    pub amount: f64,
    /// Whether money was earned or spent.
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability. The creation time is
    /// set to now, and the other fields are taken as is, so callers handling
    /// user input should go through
    /// [validate_transaction](super::validate_transaction) instead.
    pub fn build(
        description: &str,
        amount: f64,
        transaction_type: TransactionType,
        transaction_date: Date,
    ) -> NewTransaction {
        NewTransaction {
            description: description.to_owned(),
            amount,
            transaction_type,
            transaction_date,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// A transaction that has been validated but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A trimmed, non-empty description.
    pub description: String,
    /// A positive amount rounded to cents.
    pub amount: f64,
    /// Whether money was earned or spent.
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

/// Round `value` to two decimal places.
///
/// Halfway cases are rounded away from zero, e.g. 0.125 becomes 0.13, subject
/// to how closely `value * 100` can be represented as a float.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (description, amount, transaction_type, transaction_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, description, amount, transaction_type, transaction_date, created_at",
        )?
        .query_row(
            (
                new_transaction.description,
                new_transaction.amount,
                new_transaction.transaction_type,
                new_transaction.transaction_date,
                new_transaction.created_at,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, description, amount, transaction_type, transaction_date, created_at
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Delete the transaction with the ID `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a stored transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    match rows_affected {
        0 => Err(Error::DeleteMissingTransaction),
        _ => Ok(()),
    }
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // AUTOINCREMENT stops IDs of deleted rows from being reused, so ID order
    // is always insertion order.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                transaction_type TEXT NOT NULL CHECK (transaction_type IN ('Income', 'Expense')),
                transaction_date TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(transaction_date);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_type ON \"transaction\"(transaction_type);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let description = row.get(1)?;
    let amount = row.get(2)?;
    let transaction_type = row.get(3)?;
    let transaction_date = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Transaction {
        id,
        description,
        amount,
        transaction_type,
        transaction_date,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
