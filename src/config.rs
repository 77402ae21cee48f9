//! Server configuration from command line arguments and environment variables.

use std::path::PathBuf;

use clap::{Parser, builder::NonEmptyStringValueParser};
use rusqlite::Connection;

use crate::PasswordHash;

/// The value of `DATABASE_URI` that selects an in-memory database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// The REST API server for ledger_lite.
///
/// Every option can be given as a flag or through its environment variable.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory to store the SQLite database in, or ":memory:" for a
    /// database that is discarded on exit.
    #[arg(long, env = "DATABASE_URI", value_parser = NonEmptyStringValueParser::new())]
    pub database_uri: String,

    /// The name of the database file, without the ".db" extension.
    #[arg(long, env = "DB_NAME", default_value = "ledger_lite")]
    pub db_name: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// The canonical timezone name used to work out today's date, e.g. "Pacific/Auckland".
    #[arg(long, env = "LOCAL_TIMEZONE", default_value = "Etc/UTC")]
    pub local_timezone: String,

    /// The bcrypt cost for hashing passwords.
    #[arg(long, env = "BCRYPT_COST", default_value_t = PasswordHash::DEFAULT_COST)]
    pub bcrypt_cost: u32,
}

impl Config {
    /// The path of the database file, or `None` for an in-memory database.
    pub fn database_path(&self) -> Option<PathBuf> {
        if self.database_uri == IN_MEMORY_DATABASE {
            return None;
        }

        Some(PathBuf::from(&self.database_uri).join(format!("{}.db", self.db_name)))
    }

    /// Open the configured database.
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened or created.
    pub fn open_database(&self) -> Result<Connection, rusqlite::Error> {
        match self.database_path() {
            Some(path) => Connection::open(path),
            None => Connection::open_in_memory(),
        }
    }
}
