//! Database setup and connectivity checks.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    account::{create_account_table, seed_reference_accounts},
    transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the tables and indexes for the domain models and seed the reference accounts.
///
/// Everything runs in one exclusive transaction, and every step is
/// idempotent, so this is safe to call on every start up.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_account_table(&transaction)?;
    seed_reference_accounts(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Check that the database can answer a trivial query.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn ping(connection: &Connection) -> Result<(), Error> {
    connection.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

    Ok(())
}
