use secrecy::{ExposeSecret, SecretString};
use std::fmt;

const REDACTED: &str = "[redacted]";

/// The provider API key, read once when the relay starts.
pub struct ProviderCredential(SecretString);

impl ProviderCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(SecretString::from(secret.into()))
    }

    /// Read the credential from `var`. Empty values count as absent.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(Self::new)
    }

    pub fn secret(&self) -> &SecretString {
        &self.0
    }

    /// Strip any occurrence of the credential from text bound for a caller.
    pub fn redact(&self, message: &str) -> String {
        let secret = self.0.expose_secret();
        if secret.is_empty() {
            message.to_string()
        } else {
            message.replace(secret, REDACTED)
        }
    }
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderCredential([redacted])")
    }
}
