use super::types::{FailureCode, GenerateRequest, RelayErrorBody, RelayReply};
use crate::core::error::InvoiceChatError;
use crate::providers::base_client::HttpClient;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;

/// What the conversation orchestrator needs from a relay.
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Liveness ping; `Config` error when the relay has no credential.
    async fn ping(&self) -> Result<(), InvoiceChatError>;

    async fn generate(&self, request: &GenerateRequest) -> Result<RelayReply, InvoiceChatError>;
}

/// Relay client speaking the relay's HTTP contract.
#[derive(Clone)]
pub struct HttpRelayClient {
    client: HttpClient,
}

impl HttpRelayClient {
    pub fn new(relay_url: String, timeout: Option<Duration>) -> Result<Self, InvoiceChatError> {
        Ok(Self {
            client: HttpClient::new(relay_url, timeout)?,
        })
    }

    async fn post(&self, payload: &serde_json::Value) -> Result<String, InvoiceChatError> {
        let response = self.client.post("", payload, None).await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }
        Err(failure_from_body(status, &body))
    }
}

fn failure_from_body(status: StatusCode, body: &str) -> InvoiceChatError {
    if status == StatusCode::METHOD_NOT_ALLOWED {
        return InvoiceChatError::Relay("the relay rejected the request method".to_string());
    }

    match serde_json::from_str::<RelayErrorBody>(body) {
        Ok(RelayErrorBody {
            error,
            code: Some(FailureCode::Config),
        }) => InvoiceChatError::Config(error),
        Ok(RelayErrorBody { error, .. }) => InvoiceChatError::Relay(error),
        Err(_) => InvoiceChatError::Relay(format!("relay returned HTTP {}", status.as_u16())),
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn ping(&self) -> Result<(), InvoiceChatError> {
        self.post(&json!({ "ping": true })).await.map(|_| ())
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<RelayReply, InvoiceChatError> {
        let payload = serde_json::to_value(request)?;
        let body = self.post(&payload).await?;
        serde_json::from_str(&body).map_err(|e| {
            InvoiceChatError::Serialization(format!("Failed to parse relay reply: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_code_maps_to_config_error() {
        let err = failure_from_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"no credential","code":"config"}"#,
        );
        assert!(err.is_config());
    }

    #[test]
    fn provider_code_maps_to_relay_error() {
        let err = failure_from_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"RESOURCE_EXHAUSTED: quota","code":"provider"}"#,
        );
        assert!(matches!(err, InvoiceChatError::Relay(ref m) if m.contains("quota")));
    }

    #[test]
    fn non_json_failure_reports_the_status() {
        let err = failure_from_body(StatusCode::BAD_GATEWAY, "bad gateway");
        assert_eq!(err.to_string(), "Relay error: relay returned HTTP 502");
    }
}
