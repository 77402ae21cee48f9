//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's normalized email address.
    pub email: String,
    /// The user's display name, empty if they did not give one.
    pub name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}

/// The data needed to register a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's email address, normalized by [create_user].
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Lowercase `email` and strip leading and trailing whitespace.
///
/// Emails are always normalized before being stored or looked up, so
/// " Alice@Example.com " and "alice@example.com" refer to the same user.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create the user table.
///
/// Email uniqueness is enforced by the table itself so that two concurrent
/// registrations with the same email cannot both succeed.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if a user with the same normalized email already exists,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let email = normalize_email(&new_user.email);
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO user (email, password_hash, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        (
            &email,
            new_user.password_hash.as_ref(),
            &new_user.name,
            created_at,
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email,
        name: new_user.name,
        password_hash: new_user.password_hash,
        created_at,
    })
}

/// Get the user whose email matches `email` after normalization.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user ([Error::NotFound]),
/// - or there was an error trying to access the store.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, name, password_hash, created_at FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", &normalize_email(email))], map_user_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
#[cfg(test)]
pub fn count_users(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        user::{NewUser, count_users, create_user, get_user_by_email, normalize_email},
    };

    use super::create_user_table;

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_owned(),
            name: "Test".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Foo@Bar.COM \n"), "foo@bar.com");
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();

        let inserted_user = create_user(new_user("foo@bar.baz"), &db_connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, "foo@bar.baz");
        assert_eq!(inserted_user.name, "Test");
        assert_eq!(
            inserted_user.password_hash,
            PasswordHash::new_unchecked("hunter2")
        );
    }

    #[test]
    fn insert_user_stores_normalized_email() {
        let db_connection = get_db_connection();

        let inserted_user = create_user(new_user("  Foo@Bar.Baz "), &db_connection).unwrap();

        assert_eq!(inserted_user.email, "foo@bar.baz");
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let db_connection = get_db_connection();
        create_user(new_user("foo@bar.baz"), &db_connection).unwrap();

        let result = create_user(new_user(" FOO@bar.baz"), &db_connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
        assert_eq!(count_users(&db_connection).unwrap(), 1);
    }

    #[test]
    fn get_user_fails_with_unknown_email() {
        let db_connection = get_db_connection();

        assert_eq!(
            get_user_by_email("nobody@bar.baz", &db_connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_user_succeeds_with_unnormalized_email() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("foo@bar.baz"), &db_connection).unwrap();

        let retrieved_user = get_user_by_email(" Foo@Bar.Baz", &db_connection).unwrap();

        assert_eq!(retrieved_user.id, test_user.id);
        assert_eq!(retrieved_user.email, test_user.email);
        assert_eq!(retrieved_user.name, test_user.name);
        assert_eq!(retrieved_user.password_hash, test_user.password_hash);
    }

    #[test]
    fn returns_correct_count() {
        let db_connection = get_db_connection();

        let count = count_users(&db_connection).expect("Could not get user count");
        assert_eq!(0, count, "Want zero users before insertion, got {count}");

        create_user(new_user("foo@bar.baz"), &db_connection).unwrap();

        let count = count_users(&db_connection).expect("Could not get user count");
        assert_eq!(1, count, "Want one user after insertion, got {count}");
    }
}
