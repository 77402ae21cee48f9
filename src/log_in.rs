//! This file defines the route for handling log-in requests.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash,
    user::{User, UserID, get_user_by_email},
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// Checked against the password when the email is not registered.
    pub dummy_password_hash: PasswordHash,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            dummy_password_hash: state.dummy_password_hash.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw credentials sent by the client.
///
/// Both fields are optional so that a missing field is reported as
/// [Error::MissingCredentials] rather than as malformed JSON.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: Option<String>,
    /// Password entered during log-in.
    pub password: Option<String>,
}

/// The public details of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    /// The user's ID.
    pub id: UserID,
    /// The user's normalized email address.
    pub email: String,
    /// The user's display name.
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// The response body for a successful log-in or registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Always `true`, failures are reported as errors.
    pub success: bool,
    /// The user that logged in or registered.
    pub user: UserResponse,
}

impl AuthResponse {
    /// Wrap `user` in a successful response.
    pub fn new(user: User) -> Self {
        Self {
            success: true,
            user: user.into(),
        }
    }
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the user's public details are returned.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The body is not a JSON object.
/// - The email or password is missing or empty.
/// - The email does not belong to a registered user, or the password is not
///   correct. Both give the same error.
/// - An internal error occurred when verifying the password.
pub async fn post_log_in(
    State(state): State<LoginState>,
    user_data: Result<Json<LogInData>, JsonRejection>,
) -> Result<Json<AuthResponse>, Error> {
    let Json(user_data) = user_data.map_err(|_| Error::InvalidJson)?;

    let email = user_data
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty());
    let password = user_data
        .password
        .as_deref()
        .filter(|password| !password.is_empty());

    let (Some(email), Some(password)) = (email, password) else {
        return Err(Error::MissingCredentials);
    };

    let user = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        match get_user_by_email(email, &connection) {
            Ok(user) => Some(user),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        }
    };

    // Unknown emails still pay for a hash check so that response times do not
    // reveal which emails are registered.
    let Some(user) = user else {
        let _ = state.dummy_password_hash.verify(password);
        return Err(Error::InvalidCredentials);
    };

    let is_password_valid = user.password_hash.verify(password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    tracing::info!("User {} logged in", user.id);

    Ok(Json(AuthResponse::new(user)))
}
