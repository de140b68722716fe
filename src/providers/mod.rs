use crate::core::error::InvoiceChatError;
use async_trait::async_trait;
use secrecy::SecretString;

pub mod base_client;
pub mod gemini;

use gemini::types::{GeminiRequest, GeminiResponse};

/// A hosted model the relay forwards generation requests to.
///
/// The credential is handed in per call; providers never store it.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate_content(
        &self,
        model: &str,
        request: &GeminiRequest,
        credential: &SecretString,
    ) -> Result<GeminiResponse, InvoiceChatError>;
}
