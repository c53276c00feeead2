//! Configuration for the Street Trivia webhook

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriviaConfig {
    /// Address the webhook server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Google Cloud project that owns the Dialogflow agent
    #[serde(default)]
    pub project_id: String,

    /// OAuth access token for the Dialogflow API
    #[serde(default)]
    pub access_token: String,

    /// Base URL of the Dialogflow REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout for Dialogflow API calls, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Optional TOML file replacing the built-in city dataset
    #[serde(default)]
    pub dataset_path: Option<String>,

    /// Shared secret the webhook caller must send as a bearer token
    #[serde(default)]
    pub webhook_token: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_api_base_url() -> String {
    "https://dialogflow.googleapis.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Default location of the config file
pub fn default_config_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("street-trivia/config.toml").to_string_lossy().to_string())
        .unwrap_or_else(|| "/etc/street-trivia/config.toml".to_string())
}

impl Default for TriviaConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            project_id: String::new(),
            access_token: String::new(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            dataset_path: None,
            webhook_token: None,
        }
    }
}

impl TriviaConfig {
    /// Load configuration from file, with environment variable overrides
    pub fn load(path: &str, dev_mode: bool) -> Result<Self> {
        let mut config = if std::path::Path::new(path).exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(project) = std::env::var("DIALOGFLOW_PROJECT_ID") {
            config.project_id = project;
        }
        if let Ok(token) = std::env::var("DIALOGFLOW_ACCESS_TOKEN") {
            config.access_token = token;
        }
        if let Ok(addr) = std::env::var("TRIVIA_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Ok(token) = std::env::var("TRIVIA_WEBHOOK_TOKEN") {
            config.webhook_token = Some(token);
        }

        // Dev mode adjustments
        if dev_mode {
            config.listen_addr = "127.0.0.1:8080".to_string();
        }

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Project id, or an error when the admin API cannot be addressed
    pub fn require_project_id(&self) -> Result<&str> {
        if self.project_id.is_empty() {
            return Err(anyhow!(
                "Dialogflow project id not configured (set project_id or DIALOGFLOW_PROJECT_ID)"
            ));
        }
        Ok(&self.project_id)
    }
}
