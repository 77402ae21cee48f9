//! Defines the endpoint for listing transactions.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::{
        core::{Transaction, TransactionType},
        query::{TransactionFilter, TransactionQuery, query_transactions},
    },
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A transaction as it is sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// What the transaction was for.
    pub description: String,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// Whether money was earned or spent.
    pub transaction_type: TransactionType,
    /// When the transaction happened, formatted as YYYY-MM-DD.
    pub transaction_date: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            description: transaction.description,
            amount: transaction.amount,
            transaction_type: transaction.transaction_type,
            transaction_date: transaction.transaction_date.to_string(),
        }
    }
}

/// A route handler for listing transactions, newest first.
///
/// Transactions can be filtered with the optional query parameters
/// `start_date`, `end_date` and `transaction_type`.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<Vec<TransactionResponse>>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidQuery(rejection.body_text()))?;
    let filter = TransactionFilter::try_from(&query)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transactions = query_transactions(&filter, &connection)?;

    Ok(Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    ))
}
