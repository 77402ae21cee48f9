//! Reference accounts seeded when the database is first set up.
//!
//! Accounts are not used by any endpoint yet, they exist so that the
//! database starts out with the same chart of accounts everywhere.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::DatabaseId};

/// The kind of account in the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
    /// Something owned, e.g. money owed to the business.
    Asset,
    /// Something owed, e.g. unpaid bills.
    Liability,
}

impl AccountType {
    fn as_str(&self) -> &'static str {
        match self {
            AccountType::Income => "Income",
            AccountType::Expense => "Expense",
            AccountType::Asset => "Asset",
            AccountType::Liability => "Liability",
        }
    }
}

impl Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(AccountType::Income),
            "Expense" => Ok(AccountType::Expense),
            "Asset" => Ok(AccountType::Asset),
            "Liability" => Ok(AccountType::Liability),
            other => Err(format!("unknown account type \"{other}\"")),
        }
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// An account in the chart of accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The ID of the account.
    pub id: DatabaseId,
    /// The unique display name of the account.
    pub name: String,
    /// What kind of account this is.
    pub account_type: AccountType,
    /// The balance of the account.
    pub balance: f64,
    /// When the account was created.
    pub created_at: OffsetDateTime,
}

/// The accounts every database starts with.
pub const REFERENCE_ACCOUNTS: [(&str, AccountType); 5] = [
    ("Sales", AccountType::Income),
    ("Ingredients", AccountType::Expense),
    ("Supplies", AccountType::Expense),
    ("Accounts Receivable", AccountType::Asset),
    ("Accounts Payable", AccountType::Liability),
];

/// Create the account table and its lookup indexes.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                account_type TEXT NOT NULL,
                balance REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_account_type ON account(account_type);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_account_name ON account(name);",
        (),
    )?;

    Ok(())
}

/// Insert the [REFERENCE_ACCOUNTS] that are not in the database yet.
///
/// Accounts are matched by name, so calling this function more than once
/// does not create duplicates.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn seed_reference_accounts(connection: &Connection) -> Result<usize, Error> {
    let created_at = OffsetDateTime::now_utc();
    let mut statement = connection.prepare(
        "INSERT INTO account (name, account_type, balance, created_at)
         SELECT ?1, ?2, 0.0, ?3
         WHERE NOT EXISTS (SELECT 1 FROM account WHERE name = ?1)",
    )?;

    let mut inserted = 0;

    for (name, account_type) in REFERENCE_ACCOUNTS {
        if statement.execute((name, account_type, created_at))? == 1 {
            tracing::info!("Inserted account: {name}");
            inserted += 1;
        } else {
            tracing::debug!("Account already exists: {name}");
        }
    }

    Ok(inserted)
}

/// Get all accounts ordered by ID.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare("SELECT id, name, account_type, balance, created_at FROM account ORDER BY id")?
        .query_map([], map_account_row)?
        .map(|account_result| account_result.map_err(Error::SqlError))
        .collect()
}

fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        account_type: row.get(2)?,
        balance: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use super::{
        AccountType, REFERENCE_ACCOUNTS, create_account_table, get_accounts,
        seed_reference_accounts,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_account_table(&conn).unwrap();
        conn
    }

    #[test]
    fn seeds_reference_accounts() {
        let conn = get_test_connection();

        let inserted = seed_reference_accounts(&conn).unwrap();

        assert_eq!(inserted, REFERENCE_ACCOUNTS.len());
        let accounts = get_accounts(&conn).unwrap();
        let got: Vec<_> = accounts
            .iter()
            .map(|account| (account.name.as_str(), account.account_type))
            .collect();
        assert_eq!(got, REFERENCE_ACCOUNTS.to_vec());
        assert!(accounts.iter().all(|account| account.balance == 0.0));
    }

    #[test]
    fn seeding_twice_does_not_duplicate_accounts() {
        let conn = get_test_connection();
        seed_reference_accounts(&conn).unwrap();

        let inserted = seed_reference_accounts(&conn).unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(get_accounts(&conn).unwrap().len(), REFERENCE_ACCOUNTS.len());
    }

    #[test]
    fn seeding_skips_existing_names() {
        let conn = get_test_connection();
        conn.execute(
            "INSERT INTO account (name, account_type, balance, created_at)
             VALUES ('Sales', 'Income', 42.0, ?1)",
            (OffsetDateTime::now_utc(),),
        )
        .unwrap();

        let inserted = seed_reference_accounts(&conn).unwrap();

        assert_eq!(inserted, REFERENCE_ACCOUNTS.len() - 1);
        let sales: Vec<_> = get_accounts(&conn)
            .unwrap()
            .into_iter()
            .filter(|account| account.name == "Sales")
            .collect();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].balance, 42.0);
    }

    #[test]
    fn account_type_round_trips_through_text() {
        for account_type in [
            AccountType::Income,
            AccountType::Expense,
            AccountType::Asset,
            AccountType::Liability,
        ] {
            assert_eq!(account_type.to_string().parse(), Ok(account_type));
        }
        assert!("Equity".parse::<AccountType>().is_err());
    }
}
