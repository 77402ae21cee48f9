//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    timezone::local_today,
    transaction::{
        core::create_transaction,
        validation::{TransactionPayload, validate_transaction},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The response body for a newly created transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionResponse {
    /// The ID of the new transaction.
    pub id: TransactionId,
    /// A confirmation message.
    pub message: String,
}

/// A route handler for creating a new transaction.
///
/// The payload is validated before the database is touched, so a rejected
/// payload never creates a transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Result<Json<CreateTransactionResponse>, Error> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!("could not parse transaction payload: {rejection}");
        Error::InvalidJson
    })?;

    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezoneError(state.local_timezone));
    };

    let new_transaction = validate_transaction(payload, today, OffsetDateTime::now_utc())?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = create_transaction(new_transaction, &connection).inspect_err(|error| {
        tracing::error!("could not create transaction: {error}");
    })?;

    Ok(Json(CreateTransactionResponse {
        id: transaction.id,
        message: "Transaction created successfully".to_owned(),
    }))
}
