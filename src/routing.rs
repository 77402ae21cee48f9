//! Application router configuration.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, endpoints,
    health::get_health,
    income_statement::get_income_statement,
    log_in::post_log_in,
    not_found::get_404_not_found,
    register_user::register_user,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Requests from any origin are allowed, and unknown routes get a 404 JSON error.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::REGISTER, post(register_user))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(endpoints::INCOME_STATEMENT, get(get_income_statement))
        .route(endpoints::HEALTH, get(get_health))
        .fallback(get_404_not_found)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
