use crate::core::error::InvoiceChatError;
use crate::providers::base_client::HttpClient;
use crate::providers::gemini::types::*;
use reqwest::StatusCode;
use secrecy::SecretString;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Turn a non-2xx provider body into a short, user-presentable message.
pub fn describe_error_body(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<GeminiErrorEnvelope>(body) {
        Ok(envelope) => {
            let label = envelope
                .error
                .status
                .unwrap_or_else(|| status.as_u16().to_string());
            match envelope.error.message {
                Some(message) if !message.trim().is_empty() => {
                    format!("{}: {}", label, message.trim())
                }
                _ => format!("{} (HTTP {})", label, status.as_u16()),
            }
        }
        Err(_) => format!("provider returned HTTP {}", status.as_u16()),
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: HttpClient,
}

impl GeminiClient {
    pub fn new(base_url: String, timeout: Option<Duration>) -> Result<Self, InvoiceChatError> {
        Ok(Self {
            client: HttpClient::new(base_url, timeout)?,
        })
    }

    pub async fn generate_content(
        &self,
        model: &str,
        request: &GeminiRequest,
        api_key: &SecretString,
    ) -> Result<GeminiResponse, InvoiceChatError> {
        let model = model.trim_start_matches("models/");
        let response = self
            .client
            .post(
                &format!("v1beta/models/{}:generateContent", model),
                request,
                Some((API_KEY_HEADER, api_key)),
            )
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(InvoiceChatError::Api(describe_error_body(status, &body)));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            InvoiceChatError::Serialization(format!("Failed to parse Gemini response: {}", e))
        })?;

        tracing::debug!(
            model,
            candidates = parsed.candidates.len(),
            finish_reason = parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("-"),
            "gemini generateContent completed"
        );

        Ok(parsed)
    }
}
