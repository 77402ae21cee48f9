//! Transaction management for the bookkeeping application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and database functions for storing, querying, and deleting transactions
//! - Validation of transaction payloads sent by clients
//! - Filtering transactions by date range and type
//! - The route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod query;
mod transactions_endpoint;
mod validation;

pub use core::{
    NewTransaction, Transaction, TransactionType, create_transaction, create_transaction_table,
    round_to_cents,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use query::{TransactionFilter, query_transactions};
pub use transactions_endpoint::get_transactions_endpoint;
pub use validation::TransactionValidationError;

#[cfg(test)]
pub use core::{count_transactions, delete_transaction, get_transaction};
