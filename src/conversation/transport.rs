//! Wire types and transport between the client and the relay.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::error::{ClientError, ClientResult};

/// Body posted to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    /// Sender identity.
    pub sender: String,
    /// Trimmed user text.
    pub message: String,
}

/// Raw relay answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    /// HTTP status code.
    pub status: u16,
    /// Body bytes, untouched.
    pub body: Vec<u8>,
}

impl RelayReply {
    /// Build a reply.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Bot utterances carried by a successful reply.
    ///
    /// # Errors
    /// Returns [`ClientError::HttpStatus`] for non-2xx replies and
    /// [`ClientError::MalformedReply`] when the body is not a JSON array.
    pub fn into_utterances(self) -> ClientResult<Vec<String>> {
        if !self.is_success() {
            return Err(ClientError::HttpStatus(self.status));
        }
        extract_utterances(&self.body)
    }
}

/// Parse a webhook body into its utterances.
///
/// The body must be a JSON array. Each entry contributes its `text` field
/// when that field is a non-empty string; every other entry is skipped.
///
/// # Errors
/// Returns [`ClientError::MalformedReply`] if the body is not a JSON array.
pub fn extract_utterances(body: &[u8]) -> ClientResult<Vec<String>> {
    let entries: Vec<Value> = serde_json::from_slice(body)?;
    Ok(entries
        .iter()
        .filter_map(|entry| entry.get("text").and_then(Value::as_str))
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Delivers a request to the relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Send one request and return the raw reply.
    ///
    /// # Errors
    /// Returns [`ClientError::Network`] if no reply was received.
    async fn send(&self, request: &RelayRequest) -> ClientResult<RelayReply>;
}

/// HTTP transport posting JSON to the relay endpoint.
#[derive(Debug, Clone)]
pub struct HttpRelayTransport {
    client: reqwest::Client,
    relay_url: Url,
}

impl HttpRelayTransport {
    /// Create a transport with a default HTTP client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(relay_url: Url) -> ClientResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, relay_url))
    }

    /// Create a transport around an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, relay_url: Url) -> Self {
        Self { client, relay_url }
    }

    /// Relay endpoint.
    #[must_use]
    pub const fn relay_url(&self) -> &Url {
        &self.relay_url
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn send(&self, request: &RelayRequest) -> ClientResult<RelayReply> {
        let response = self
            .client
            .post(self.relay_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(RelayReply::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keeps_order_and_drops_empty_text() -> ClientResult<()> {
        let body = br#"[{"text":"A"},{"text":""},{"text":"B"}]"#;
        assert_eq!(extract_utterances(body)?, vec!["A", "B"]);
        Ok(())
    }

    #[test]
    fn test_extract_skips_non_text_entries() -> ClientResult<()> {
        let body = br#"[
            {"recipient_id":"campus-x","text":"Hi"},
            {"recipient_id":"campus-x","image":"http://img"},
            {"text":42},
            "loose string",
            null,
            {"text":"Bye"}
        ]"#;
        assert_eq!(extract_utterances(body)?, vec!["Hi", "Bye"]);
        Ok(())
    }

    #[test]
    fn test_extract_rejects_non_array() {
        assert!(matches!(
            extract_utterances(br#"{"text":"A"}"#),
            Err(ClientError::MalformedReply(_))
        ));
        assert!(extract_utterances(b"<html>").is_err());
    }

    #[test]
    fn test_non_success_status_is_an_error() {
        let reply = RelayReply::new(502, r#"{"error":"Failed to connect to Rasa server"}"#);
        assert!(!reply.is_success());
        assert!(matches!(
            reply.into_utterances(),
            Err(ClientError::HttpStatus(502))
        ));
    }

    #[test]
    fn test_success_status_parses_body() -> ClientResult<()> {
        let reply = RelayReply::new(200, r#"[{"text":"Hello"}]"#);
        assert_eq!(reply.into_utterances()?, vec!["Hello"]);
        Ok(())
    }
}
