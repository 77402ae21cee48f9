//! The health check route.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, db::ping};

/// The state needed to check the health of the server.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// The database connection to ping.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HealthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a health check response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" if the database answered, otherwise "error".
    pub status: String,
    /// "connected" or "disconnected".
    pub database: String,
    /// Why the database check failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    fn healthy() -> Self {
        Self {
            status: "ok".to_owned(),
            database: "connected".to_owned(),
            error: None,
        }
    }

    fn unhealthy(error: impl ToString) -> Self {
        Self {
            status: "error".to_owned(),
            database: "disconnected".to_owned(),
            error: Some(error.to_string()),
        }
    }
}

/// Report whether the server can reach its database.
///
/// Always responds with 200 OK. Database failures are reported in the body.
pub async fn get_health(State(state): State<HealthState>) -> Json<HealthResponse> {
    let result = match state.db_connection.lock() {
        Ok(connection) => ping(&connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(crate::Error::DatabaseLockError)
        }
    };

    match result {
        Ok(()) => Json(HealthResponse::healthy()),
        Err(error) => {
            tracing::warn!("Health check failed: {error}");
            Json(HealthResponse::unhealthy(error))
        }
    }
}

#[cfg(test)]
mod health_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::endpoints;

    use super::{HealthResponse, HealthState, get_health};

    fn get_test_server(db_connection: Arc<Mutex<Connection>>) -> TestServer {
        let app = Router::new()
            .route(endpoints::HEALTH, get(get_health))
            .with_state(HealthState { db_connection });

        TestServer::new(app)
    }

    #[tokio::test]
    async fn reports_connected_database() {
        let conn = Connection::open_in_memory().unwrap();
        let server = get_test_server(Arc::new(Mutex::new(conn)));

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({"status": "ok", "database": "connected"}));
    }

    #[tokio::test]
    async fn reports_poisoned_lock_as_disconnected() {
        let db_connection = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let poisoner = db_connection.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        let server = get_test_server(db_connection);

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "error");
        assert_eq!(body.database, "disconnected");
        assert_eq!(
            body.error.as_deref(),
            Some("could not acquire the database lock")
        );
    }
}
