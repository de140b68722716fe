use crate::chat::orchestrator::DEFAULT_MAX_FUNCTION_ROUNDS;
use crate::core::error::InvoiceChatError;
use crate::display::DisplayMode;
use crate::providers::gemini::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = ".invoicechat";

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_path() -> String {
    "/api/chat".to_string()
}

fn default_provider_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_credential_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_relay_url() -> String {
    format!("http://{}{}", default_bind(), default_path())
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_function_rounds() -> usize {
    DEFAULT_MAX_FUNCTION_ROUNDS
}

fn default_language() -> String {
    "English".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
    /// Name of the environment variable holding the provider key. The key
    /// itself never goes in this file.
    #[serde(default = "default_credential_env")]
    pub credential_env: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            path: default_path(),
            provider_base_url: default_provider_base_url(),
            credential_env: default_credential_env(),
            request_timeout_secs: None,
        }
    }
}

impl RelayConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_function_rounds")]
    pub max_function_rounds: usize,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            model: default_model(),
            max_function_rounds: default_max_function_rounds(),
            language: default_language(),
            temperature: None,
            request_timeout_secs: None,
        }
    }
}

impl ChatConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Defaults to `~/.invoicechat/invoices.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub display_mode: DisplayMode,
}

impl Config {
    fn home_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn data_dir() -> PathBuf {
        Self::home_dir().join(APP_DIR)
    }

    pub fn default_path() -> PathBuf {
        Self::data_dir().join("config.yaml")
    }

    pub fn input_history_path() -> PathBuf {
        Self::data_dir().join("input_history.txt")
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("invoices.json"))
    }

    /// Load from `path`, or the default location. A missing file is created
    /// with defaults so users have something to edit.
    pub fn load(path: Option<&Path>) -> Result<Config, InvoiceChatError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            return Self::parse(&contents)
                .map_err(|e| InvoiceChatError::Config(format!("Parse {}: {}", path.display(), e)));
        }

        let config = Config::default();
        if let Err(e) = config.save_to(&path) {
            tracing::debug!(path = %path.display(), error = %e, "could not write default config");
        }
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Config, serde_yml::Error> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), InvoiceChatError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(path, yaml_content)?;
        Ok(())
    }
}
