//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::{HeaderMap, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// The number of characters of a body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// JSON fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 4] = ["password", "confirmPassword", "adminCode", "token"];

const REDACTED_TEXT: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords, admin codes and tokens in JSON bodies are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return Error::InvalidRequest("Could not read request body.".to_owned()).into_response();
        }
    };

    log_request(&parts, &display_body(&parts.headers, &body_bytes));

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return Response::from_parts(parts, Body::empty());
        }
    };

    log_response(&parts, &display_body(&parts.headers, &body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

/// The text of `body` that is safe to log.
fn display_body(headers: &HeaderMap, body: &Bytes) -> String {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json && let Ok(mut json) = serde_json::from_slice::<Value>(body) {
        redact_secrets(&mut json);
        return json.to_string();
    }

    String::from_utf8_lossy(body).to_string()
}

/// Replace the values of the fields in [REDACTED_FIELDS], at any depth.
fn redact_secrets(json: &mut Value) {
    match json {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *value = Value::String(REDACTED_TEXT.to_owned());
                } else {
                    redact_secrets(value);
                }
            }
        }
        Value::Array(values) => values.iter_mut().for_each(redact_secrets),
        _ => {}
    }
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, if it is longer than that.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!(
                "Received request: {} {}\nbody: {truncated}...",
                parts.method,
                parts.uri
            );
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        ),
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {}\nbody: {truncated}...", parts.status);
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {}\nbody: {body:?}", parts.status),
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{
        Json, Router,
        body::Bytes,
        http::{HeaderMap, HeaderValue, header::CONTENT_TYPE},
        middleware,
        routing::post,
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{LOG_BODY_LENGTH_LIMIT, display_body, logging_middleware, truncate};

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn redacts_secret_fields() {
        let body = Bytes::from(
            json!({
                "email": "alice@example.com",
                "password": "hunter2",
                "confirmPassword": "hunter2",
                "adminCode": "letmein",
                "nested": { "token": "abc.def.ghi" },
            })
            .to_string(),
        );

        let got: Value = serde_json::from_str(&display_body(&json_headers(), &body)).unwrap();

        assert_eq!(got["email"], "alice@example.com");
        assert_eq!(got["password"], "********");
        assert_eq!(got["confirmPassword"], "********");
        assert_eq!(got["adminCode"], "********");
        assert_eq!(got["nested"]["token"], "********");
    }

    #[test]
    fn leaves_non_json_body_alone() {
        let body = Bytes::from_static(b"password=hunter2");

        assert_eq!(display_body(&HeaderMap::new(), &body), "password=hunter2");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let short = "a".repeat(LOG_BODY_LENGTH_LIMIT);
        let long = "é".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        assert_eq!(truncate(&short), None);
        assert_eq!(
            truncate(&long).map(|text| text.chars().count()),
            Some(LOG_BODY_LENGTH_LIMIT)
        );
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        async fn echo(Json(body): Json<Value>) -> Json<Value> {
            Json(body)
        }
        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let body = json!({ "password": "hunter2", "title": "Lunch" });

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        response.assert_json(&body);
    }
}
