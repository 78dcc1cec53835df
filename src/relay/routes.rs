//! HTTP route handlers for the relay API.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RelayError;
use super::state::AppState;

/// Path of the relay endpoint.
pub const RELAY_PATH: &str = "/api/rasa";

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(RELAY_PATH, post(relay_message))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "campus-relay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Message forwarded to the webhook, exactly as received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPayload {
    /// Opaque session key of the chat client.
    pub sender: String,
    /// User text.
    pub message: String,
}

impl RelayPayload {
    /// Validate a raw request body.
    ///
    /// Both fields must be strings that are not blank after trimming. The
    /// values are kept untrimmed.
    ///
    /// # Errors
    /// Returns [`RelayError::BadRequest`] for anything else.
    pub fn from_json(body: &[u8]) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| RelayError::BadRequest("body is not valid JSON"))?;

        let sender = required_text(&value, "sender", "sender must be a non-empty string")?;
        let message = required_text(&value, "message", "message must be a non-empty string")?;

        Ok(Self { sender, message })
    }
}

fn required_text(value: &Value, field: &str, reason: &'static str) -> Result<String, RelayError> {
    match value.get(field).and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_owned()),
        _ => Err(RelayError::BadRequest(reason)),
    }
}

/// Handle relay requests.
async fn relay_message(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, RelayError> {
    let payload = RelayPayload::from_json(&body)?;
    forward(&state, &payload).await
}

/// Forward a payload to the webhook and mirror its response.
///
/// The downstream status, body bytes and content-type are returned as-is;
/// content-type defaults to `application/json` when the webhook omits it.
///
/// # Errors
/// Returns [`RelayError::GatewayFailure`] if the webhook cannot be reached or
/// its body cannot be read.
pub async fn forward(state: &AppState, payload: &RelayPayload) -> Result<Response, RelayError> {
    let downstream = state
        .client
        .post(state.webhook_url.clone())
        .json(payload)
        .send()
        .await?;

    let status = downstream.status();
    let content_type = downstream
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let body = downstream.bytes().await?;

    tracing::debug!(
        sender = %payload.sender,
        status = status.as_u16(),
        bytes = body.len(),
        "Relayed message to webhook"
    );

    Ok((status, [(CONTENT_TYPE, content_type)], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;
    use tower::ServiceExt;
    use url::Url;

    use crate::relay::error::{BAD_REQUEST_MESSAGE, GATEWAY_FAILURE_MESSAGE};

    type TestResult = Result<(), Box<dyn Error>>;

    /// Scripted stand-in for the Rasa webhook.
    struct MockWebhook {
        url: Url,
        calls: Arc<AtomicUsize>,
        last_payload: Arc<Mutex<Option<Value>>>,
    }

    async fn spawn_webhook(
        status: StatusCode,
        content_type: Option<&'static str>,
        body: &'static str,
    ) -> Result<MockWebhook, Box<dyn Error>> {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_payload = Arc::new(Mutex::new(None));

        let counter = Arc::clone(&calls);
        let recorder = Arc::clone(&last_payload);
        let app = Router::new().route(
            "/webhooks/rest/webhook",
            post(move |Json(payload): Json<Value>| {
                let counter = Arc::clone(&counter);
                let recorder = Arc::clone(&recorder);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    *recorder.lock().await = Some(payload);

                    let mut response = Body::from(body).into_response();
                    *response.status_mut() = status;
                    if let Some(content_type) = content_type {
                        response
                            .headers_mut()
                            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
                    }
                    response
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(MockWebhook {
            url: Url::parse(&format!("http://{addr}/webhooks/rest/webhook"))?,
            calls,
            last_payload,
        })
    }

    fn relay_for(url: Url) -> Router {
        create_router(AppState::with_client(reqwest::Client::new(), url))
    }

    fn post_json(body: &str) -> Result<Request<Body>, axum::http::Error> {
        Request::builder()
            .method("POST")
            .uri(RELAY_PATH)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
    }

    async fn body_bytes(response: Response) -> Result<Bytes, axum::Error> {
        axum::body::to_bytes(response.into_body(), usize::MAX).await
    }

    #[test]
    fn test_payload_validation() {
        assert!(RelayPayload::from_json(br#"{"sender":"a","message":"hi"}"#).is_ok());
        assert!(RelayPayload::from_json(br#"{"message":"hi"}"#).is_err());
        assert!(RelayPayload::from_json(br#"{"sender":"a"}"#).is_err());
        assert!(RelayPayload::from_json(br#"{"sender":42,"message":"hi"}"#).is_err());
        assert!(RelayPayload::from_json(br#"{"sender":"a","message":"   "}"#).is_err());
        assert!(RelayPayload::from_json(br#"{"sender":"","message":"hi"}"#).is_err());
        assert!(RelayPayload::from_json(b"not json").is_err());
        assert!(RelayPayload::from_json(b"[]").is_err());
    }

    #[test]
    fn test_payload_keeps_untrimmed_values() -> Result<(), RelayError> {
        let payload = RelayPayload::from_json(br#"{"sender":" s1 ","message":"  hello "}"#)?;
        assert_eq!(payload.sender, " s1 ");
        assert_eq!(payload.message, "  hello ");
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_payloads_never_reach_webhook() -> TestResult {
        let webhook = spawn_webhook(StatusCode::OK, Some("application/json"), "[]").await?;

        let bodies = [
            r#"{"message":"hi"}"#,
            r#"{"sender":"s1"}"#,
            r#"{"sender":"s1","message":""}"#,
            r#"{"sender":"  ","message":"hi"}"#,
            r#"{"sender":"s1","message":["hi"]}"#,
            "garbage",
        ];

        for body in bodies {
            let response = relay_for(webhook.url.clone()).oneshot(post_json(body)?).await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");

            let json: Value = serde_json::from_slice(&body_bytes(response).await?)?;
            assert_eq!(json["error"], BAD_REQUEST_MESSAGE);
        }

        assert_eq!(webhook.calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_success_is_passed_through_verbatim() -> TestResult {
        let downstream_body = r#"[{"recipient_id":"s1","text":"Hi there"}]"#;
        let webhook = spawn_webhook(
            StatusCode::OK,
            Some("application/json; charset=utf-8"),
            downstream_body,
        )
        .await?;

        let response = relay_for(webhook.url.clone())
            .oneshot(post_json(r#"{"sender":"s1","message":" hello "}"#)?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json; charset=utf-8"))
        );
        assert_eq!(body_bytes(response).await?, Bytes::from_static(downstream_body.as_bytes()));

        assert_eq!(webhook.calls.load(Ordering::SeqCst), 1);
        let forwarded = webhook.last_payload.lock().await.clone();
        assert_eq!(
            forwarded,
            Some(serde_json::json!({"sender": "s1", "message": " hello "}))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_downstream_status_and_default_content_type() -> TestResult {
        let webhook = spawn_webhook(StatusCode::SERVICE_UNAVAILABLE, None, "busy").await?;

        let response = relay_for(webhook.url.clone())
            .oneshot(post_json(r#"{"sender":"s1","message":"hello"}"#)?)
            .await?;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(body_bytes(response).await?, Bytes::from_static(b"busy"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_bad_gateway() -> TestResult {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/webhooks/rest/webhook"))?;
        let response = relay_for(url)
            .oneshot(post_json(r#"{"sender":"s1","message":"hello"}"#)?)
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json: Value = serde_json::from_slice(&body_bytes(response).await?)?;
        assert_eq!(json, serde_json::json!({ "error": GATEWAY_FAILURE_MESSAGE }));
        Ok(())
    }

    #[tokio::test]
    async fn test_health_check() -> TestResult {
        let url = Url::parse("http://127.0.0.1:9/unused")?;
        let response = relay_for(url)
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_slice(&body_bytes(response).await?)?;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "campus-relay");
        Ok(())
    }
}
