use crate::core::error::InvoiceChatError;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

/// Thin JSON-over-HTTP client shared by the provider client and the relay client.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub fn new(base_url: String, timeout: Option<Duration>) -> Result<Self, InvoiceChatError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            InvoiceChatError::Config(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// POST `payload` as JSON. When `secret_header` is given the value is sent
    /// as a sensitive header so it never shows up in debug output.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        secret_header: Option<(&'static str, &SecretString)>,
    ) -> Result<Response, InvoiceChatError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some((name, secret)) = secret_header {
            let mut value = HeaderValue::from_str(secret.expose_secret()).map_err(|_| {
                InvoiceChatError::Config(format!("Credential is not a valid {} value", name))
            })?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(name), value);
        }

        let response = self
            .client
            .post(self.url(path))
            .headers(headers)
            .json(payload)
            .send()
            .await?;
        Ok(response)
    }
}
