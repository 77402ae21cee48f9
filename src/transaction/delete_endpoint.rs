//! Defines the endpoint for deleting a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, database_id::TransactionId, transaction::core::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a deleted transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTransactionResponse {
    /// A confirmation message.
    pub message: String,
}

/// A route handler for deleting a transaction.
///
/// The ID is taken as a string so that malformed IDs are reported as a bad
/// request with the same JSON error body as every other failure.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<DeleteTransactionResponse>, Error> {
    let transaction_id = parse_transaction_id(&transaction_id)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_transaction(transaction_id, &connection).inspect_err(|error| {
        if *error != Error::DeleteMissingTransaction {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
        }
    })?;

    Ok(Json(DeleteTransactionResponse {
        message: "Transaction deleted successfully".to_owned(),
    }))
}

/// Parse a transaction ID from a path segment.
///
/// Stored IDs start at 1, so zero and negative numbers are rejected along
/// with anything that is not an integer.
fn parse_transaction_id(raw_id: &str) -> Result<TransactionId, Error> {
    match raw_id.parse::<TransactionId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::InvalidTransactionId),
    }
}
