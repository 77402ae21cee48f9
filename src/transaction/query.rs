//! Filtering transactions by date range and type.

use rusqlite::{Connection, ToSql};
use serde::{Deserialize, Serialize};

use crate::Error;

use super::core::{Transaction, TransactionType, map_transaction_row};

/// The optional query string parameters for filtering transactions.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionQuery {
    /// Only include transactions on or after this date.
    pub start_date: Option<String>,
    /// Only include transactions on or before this date.
    pub end_date: Option<String>,
    /// Only include transactions of this type.
    pub transaction_type: Option<String>,
}

/// A validated set of constraints on which transactions to fetch.
///
/// Dates are compared as strings. Stored dates use the ISO 8601 format
/// YYYY-MM-DD, so string order is the same as date order, and partial
/// bounds such as "2025-03" behave as expected.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Inclusive lower bound on the transaction date.
    pub start_date: Option<String>,
    /// Inclusive upper bound on the transaction date.
    pub end_date: Option<String>,
    /// Restrict results to a single transaction type.
    pub transaction_type: Option<TransactionType>,
}

impl TransactionFilter {
    /// Build a filter from optional, unvalidated query parameters.
    ///
    /// Empty strings are treated the same as missing parameters.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTransactionType] if `transaction_type` is not
    /// "Income" or "Expense".
    pub fn build(
        start_date: Option<&str>,
        end_date: Option<&str>,
        transaction_type: Option<&str>,
    ) -> Result<Self, Error> {
        let transaction_type = non_empty(transaction_type)
            .map(|transaction_type| {
                transaction_type
                    .parse::<TransactionType>()
                    .map_err(|_| Error::InvalidTransactionType)
            })
            .transpose()?;

        Ok(Self {
            start_date: non_empty(start_date).map(str::to_owned),
            end_date: non_empty(end_date).map(str::to_owned),
            transaction_type,
        })
    }

    /// Convert the filter into an SQL `WHERE` clause and its parameters.
    ///
    /// The clause uses anonymous `?` parameters in the same order as the
    /// returned parameter list. An empty clause means "match everything".
    pub fn to_predicate(&self) -> (String, Vec<&dyn ToSql>) {
        let mut conditions = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();

        if let Some(transaction_type) = &self.transaction_type {
            conditions.push("transaction_type = ?");
            params.push(transaction_type);
        }

        if let Some(start_date) = &self.start_date {
            conditions.push("transaction_date >= ?");
            params.push(start_date);
        }

        if let Some(end_date) = &self.end_date {
            conditions.push("transaction_date <= ?");
            params.push(end_date);
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

impl TryFrom<&TransactionQuery> for TransactionFilter {
    type Error = Error;

    fn try_from(query: &TransactionQuery) -> Result<Self, Self::Error> {
        TransactionFilter::build(
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            query.transaction_type.as_deref(),
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Get the transactions matching `filter`.
///
/// Transactions are sorted by date, newest first. Transactions on the same
/// date are sorted newest first by when they were added.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped to
/// a [Transaction].
pub fn query_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (predicate, params) = filter.to_predicate();

    let query = format!(
        "SELECT id, description, amount, transaction_type, transaction_date, created_at \
        FROM \"transaction\" {predicate} \
        ORDER BY transaction_date DESC, id DESC"
    );

    connection
        .prepare(&query)?
        .query_map(params.as_slice(), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}
