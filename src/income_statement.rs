//! The income statement report: total income, total expenses and net income
//! over an optional date range.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    transaction::{Transaction, TransactionFilter, TransactionType, query_transactions, round_to_cents},
};

/// Totals of income and expenses for a set of transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all expenses.
    pub expenses: f64,
    /// Income minus expenses.
    pub net_income: f64,
}

impl IncomeStatement {
    /// Sum `transactions` into an income statement.
    ///
    /// Totals are accumulated at full precision and rounded to cents at the end.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let (income, expenses) = transactions.into_iter().fold(
            (0.0, 0.0),
            |(income, expenses), transaction| match transaction.transaction_type {
                TransactionType::Income => (income + transaction.amount, expenses),
                TransactionType::Expense => (income, expenses + transaction.amount),
            },
        );

        Self {
            income: round_to_cents(income),
            expenses: round_to_cents(expenses),
            net_income: round_to_cents(income - expenses),
        }
    }
}

/// The optional query string parameters for the income statement.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatementQuery {
    /// Only include transactions on or after this date.
    pub start_date: Option<String>,
    /// Only include transactions on or before this date.
    pub end_date: Option<String>,
}

/// The state needed to build the income statement.
#[derive(Debug, Clone)]
pub struct IncomeStatementState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for IncomeStatementState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for the income statement.
///
/// Uses the same date range semantics as the transaction listing, but always
/// includes both income and expenses.
pub async fn get_income_statement(
    State(state): State<IncomeStatementState>,
    query: Result<Query<IncomeStatementQuery>, QueryRejection>,
) -> Result<Json<IncomeStatement>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidQuery(rejection.body_text()))?;
    let filter =
        TransactionFilter::build(query.start_date.as_deref(), query.end_date.as_deref(), None)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transactions = query_transactions(&filter, &connection)?;

    Ok(Json(IncomeStatement::from_transactions(&transactions)))
}

#[cfg(test)]
mod aggregation_tests {
    use time::{OffsetDateTime, macros::date};

    use crate::transaction::{Transaction, TransactionType};

    use super::IncomeStatement;

    fn transaction(amount: f64, transaction_type: TransactionType) -> Transaction {
        Transaction {
            id: 1,
            description: String::new(),
            amount,
            transaction_type,
            transaction_date: date!(2025 - 01 - 01),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn empty_input_is_all_zeros() {
        let got = IncomeStatement::from_transactions(&[]);

        assert_eq!(
            got,
            IncomeStatement {
                income: 0.0,
                expenses: 0.0,
                net_income: 0.0
            }
        );
    }

    #[test]
    fn sums_income_and_expenses_separately() {
        let transactions = [
            transaction(60.0, TransactionType::Income),
            transaction(40.0, TransactionType::Income),
            transaction(15.0, TransactionType::Expense),
            transaction(25.0, TransactionType::Expense),
        ];

        let got = IncomeStatement::from_transactions(&transactions);

        assert_eq!(
            got,
            IncomeStatement {
                income: 100.0,
                expenses: 40.0,
                net_income: 60.0
            }
        );
    }

    #[test]
    fn net_income_can_be_negative() {
        let transactions = [
            transaction(10.0, TransactionType::Income),
            transaction(25.5, TransactionType::Expense),
        ];

        let got = IncomeStatement::from_transactions(&transactions);

        assert_eq!(got.net_income, -15.5);
    }

    #[test]
    fn rounds_totals_to_cents() {
        let transactions = [
            transaction(0.1, TransactionType::Income),
            transaction(0.2, TransactionType::Income),
        ];

        let got = IncomeStatement::from_transactions(&transactions);

        assert_eq!(got.income, 0.3);
        assert_eq!(got.net_income, 0.3);
    }
}

#[cfg(test)]
mod endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints,
        transaction::{Transaction, TransactionType, create_transaction},
    };

    use super::{IncomeStatement, IncomeStatementState, get_income_statement};

    fn get_test_server(transactions: &[(f64, TransactionType, time::Date)]) -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        for &(amount, transaction_type, date) in transactions {
            create_transaction(
                Transaction::build("test", amount, transaction_type, date),
                &conn,
            )
            .unwrap();
        }

        let state = IncomeStatementState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let app = Router::new()
            .route(endpoints::INCOME_STATEMENT, get(get_income_statement))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn empty_database_is_all_zeros() {
        let server = get_test_server(&[]);

        let response = server.get(endpoints::INCOME_STATEMENT).await;

        response.assert_status_ok();
        let statement: IncomeStatement = response.json();
        assert_eq!(statement, IncomeStatement::default());
    }

    #[tokio::test]
    async fn sums_all_transactions() {
        let server = get_test_server(&[
            (100.0, TransactionType::Income, date!(2025 - 01 - 10)),
            (40.0, TransactionType::Expense, date!(2025 - 01 - 11)),
        ]);

        let response = server.get(endpoints::INCOME_STATEMENT).await;

        response.assert_status_ok();
        let statement: IncomeStatement = response.json();
        assert_eq!(
            statement,
            IncomeStatement {
                income: 100.0,
                expenses: 40.0,
                net_income: 60.0
            }
        );
    }

    #[tokio::test]
    async fn only_counts_transactions_in_date_range() {
        let server = get_test_server(&[
            (100.0, TransactionType::Income, date!(2025 - 01 - 10)),
            (40.0, TransactionType::Expense, date!(2025 - 01 - 11)),
            (500.0, TransactionType::Income, date!(2025 - 02 - 01)),
            (7.0, TransactionType::Expense, date!(2024 - 12 - 31)),
        ]);

        let response = server
            .get(endpoints::INCOME_STATEMENT)
            .add_query_param("start_date", "2025-01-01")
            .add_query_param("end_date", "2025-01-31")
            .await;

        response.assert_status_ok();
        let statement: IncomeStatement = response.json();
        assert_eq!(
            statement,
            IncomeStatement {
                income: 100.0,
                expenses: 40.0,
                net_income: 60.0
            }
        );
    }
}
