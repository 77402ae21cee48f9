//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, PasswordHash, db::initialize};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Used to work out today's date for transactions created without one.
    pub local_timezone: String,

    /// The bcrypt cost used when hashing the passwords of new users.
    pub password_hash_cost: u32,

    /// A hash with the same cost as user passwords, checked when a log-in
    /// names an unknown email so that the response takes as long as a wrong password.
    pub dummy_password_hash: PasswordHash,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models
    /// and seeding the reference accounts.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the dummy
    /// password hash cannot be created.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        password_hash_cost: u32,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;
        let dummy_password_hash = PasswordHash::new("not a real password", password_hash_cost)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            password_hash_cost,
            dummy_password_hash,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
