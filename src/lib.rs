//! Ledger Lite is a small bookkeeping backend for recording income and
//! expenses.
//!
//! This library provides a JSON REST API for registering and logging in
//! users, recording and deleting transactions, and producing a simple income
//! statement over a date range.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::{Deserialize, Serialize};
use tokio::signal;

mod account;
mod app_state;
mod config;
mod database_id;
mod db;
mod endpoints;
mod health;
mod income_statement;
mod log_in;
mod logging;
mod not_found;
mod password;
mod register_user;
mod routing;
mod timezone;
mod transaction;
mod user;

pub use account::{Account, AccountType, get_accounts};
pub use app_state::AppState;
pub use config::Config;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::PasswordHash;
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{NewTransaction, Transaction, TransactionType, create_transaction};
pub use user::{NewUser, User, UserID, create_user, get_user_by_email, normalize_email};

use crate::transaction::TransactionValidationError;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body could not be parsed as the expected JSON object.
    #[error("Invalid JSON data")]
    InvalidJson,

    /// The email or password was missing from a log-in or registration request.
    #[error("Email and password are required")]
    MissingCredentials,

    /// The email does not belong to a registered user, or the password is wrong.
    ///
    /// Both cases share one message so that clients cannot tell which
    /// of the two failed.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A user with the same normalized email is already registered.
    #[error("User with this email already exists")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A transaction payload failed validation.
    #[error("{0}")]
    InvalidTransaction(TransactionValidationError),

    /// The query string could not be parsed.
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// A transaction filter named a type other than income or expense.
    #[error("Invalid transaction type")]
    InvalidTransactionType,

    /// The transaction ID in the request path is not a valid ID.
    #[error("Invalid transaction ID")]
    InvalidTransactionId,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("Not Found")]
    NotFound,

    /// Tried to delete a transaction that does not exist
    #[error("Transaction not found")]
    DeleteMissingTransaction,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<TransactionValidationError> for Error {
    fn from(value: TransactionValidationError) -> Self {
        Error::InvalidTransaction(value)
    }
}

impl Error {
    /// The HTTP status code the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson
            | Error::MissingCredentials
            | Error::DuplicateEmail
            | Error::InvalidTransaction(_)
            | Error::InvalidQuery(_)
            | Error::InvalidTransactionType
            | Error::InvalidTransactionId => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::NotFound | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The JSON body sent to the client for any failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The HTTP status code of the response.
    pub status: u16,
    /// A human readable description of what went wrong.
    pub detail: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        let body = ErrorResponse {
            status: status.as_u16(),
            detail: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
