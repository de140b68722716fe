use crate::core::error::InvoiceChatError;
use crate::providers::ModelProvider;
use async_trait::async_trait;
use secrecy::SecretString;
use std::time::Duration;

mod client;
pub mod types;

pub use client::{GeminiClient, describe_error_body};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone)]
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    pub fn with_endpoint(
        endpoint: String,
        timeout: Option<Duration>,
    ) -> Result<Self, InvoiceChatError> {
        Ok(Self {
            client: GeminiClient::new(endpoint, timeout)?,
        })
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &types::GeminiRequest,
        credential: &SecretString,
    ) -> Result<types::GeminiResponse, InvoiceChatError> {
        self.client.generate_content(model, request, credential).await
    }
}
