//! Middleware for logging requests and responses.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{Error, ErrorResponse};

/// The JSON fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 1] = ["password"];

/// The text used in place of redacted values.
const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords in JSON request bodies are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return Error::InvalidJson.into_response();
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    if is_json(&parts) {
        log_request(&parts, &redact_json_fields(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_bytes.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            return (
                status,
                Json(ErrorResponse {
                    status: status.as_u16(),
                    detail: error.to_string(),
                }),
            )
                .into_response();
        }
    };
    log_response(&parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, body_bytes.into())
}

fn is_json(parts: &axum::http::request::Parts) -> bool {
    parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"))
}

/// Replace the values of sensitive fields in a JSON object.
///
/// Text that is not a JSON object is returned unchanged.
fn redact_json_fields(body_text: &str) -> String {
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(body_text) else {
        return body_text.to_owned();
    };

    for field_name in REDACTED_FIELDS {
        if let Some(value) = object.get_mut(field_name) {
            *value = Value::String(REDACTED.to_owned());
        }
    }

    Value::Object(object).to_string()
}

/// The number of characters of a body to log at the `info` level.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Get the first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if
/// `body` is short enough to log in full.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Received request: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod redaction_tests {
    use serde_json::{Value, json};

    use super::{LOG_BODY_LENGTH_LIMIT, REDACTED, redact_json_fields, truncate};

    #[test]
    fn redacts_password() {
        let body = json!({"email": "alice@example.com", "password": "hunter2"}).to_string();

        let got = redact_json_fields(&body);

        let got: Value = serde_json::from_str(&got).unwrap();
        assert_eq!(
            got,
            json!({"email": "alice@example.com", "password": REDACTED})
        );
    }

    #[test]
    fn leaves_other_bodies_unchanged() {
        for body in ["", "not json", "[1, 2]", r#"{"description": "Flour"}"#] {
            let got = redact_json_fields(body);

            let want = serde_json::from_str::<Value>(body)
                .ok()
                .filter(Value::is_object)
                .map(|value| value.to_string())
                .unwrap_or_else(|| body.to_owned());
            assert_eq!(got, want);
        }
    }

    #[test]
    fn short_bodies_are_not_truncated() {
        assert_eq!(truncate("short"), None);
        assert_eq!(truncate(&"a".repeat(LOG_BODY_LENGTH_LIMIT)), None);
    }

    #[test]
    fn truncates_on_character_boundaries() {
        let body = "é".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        let got = truncate(&body).unwrap();

        assert_eq!(got.chars().count(), LOG_BODY_LENGTH_LIMIT);
    }
}

#[cfg(test)]
mod middleware_tests {
    use axum::{Json, Router, middleware, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::logging_middleware;

    #[tokio::test]
    async fn passes_request_and_response_through() {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app);
        let body = json!({"email": "alice@example.com", "password": "hunter2"});

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        response.assert_json(&body);
    }
}
