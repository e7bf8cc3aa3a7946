use config::{Config as ConfigBuilder, Environment};
use serde::Deserialize;

use crate::constants::{GEOCODER_API_BASE, NWS_API_BASE, OLLAMA_API_BASE, OLLAMA_MODEL, USER_AGENT};
use crate::error::Error;
use crate::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret expected in `X-API-Key`; empty rejects every request
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,
    /// Requests per second per client
    #[serde(default = "default_rate_limit")]
    pub rate_limit: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_nws_url")]
    pub nws_url: String,
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_port() -> u16 {
    8080
}

fn default_ollama_url() -> String {
    OLLAMA_API_BASE.to_string()
}

fn default_ollama_model() -> String {
    OLLAMA_MODEL.to_string()
}

fn default_rate_limit() -> f64 {
    1.0
}

fn default_max_retries() -> u32 {
    3
}

fn default_nws_url() -> String {
    NWS_API_BASE.to_string()
}

fn default_geocoder_url() -> String {
    GEOCODER_API_BASE.to_string()
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            api_key: String::new(),
            ollama_url: default_ollama_url(),
            ollama_model: default_ollama_model(),
            rate_limit: default_rate_limit(),
            max_retries: default_max_retries(),
            nws_url: default_nws_url(),
            geocoder_url: default_geocoder_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        let settings = ConfigBuilder::builder()
            .add_source(Environment::default())
            .build()
            .map_err(|e| Error::Config(format!("failed to build configuration: {e}")))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| Error::Config(format!("failed to deserialize configuration: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rate_limit.is_finite() || self.rate_limit <= 0.0 {
            return Err(Error::Config(format!(
                "RATE_LIMIT must be a positive number, got {}",
                self.rate_limit
            )));
        }

        if self.max_retries > 10 {
            return Err(Error::Config("MAX_RETRIES cannot exceed 10".to_string()));
        }

        for (name, url) in [
            ("OLLAMA_URL", &self.ollama_url),
            ("NWS_URL", &self.nws_url),
            ("GEOCODER_URL", &self.geocoder_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "{name} must be an HTTP or HTTPS URL, got '{url}'"
                )));
            }
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("USER_AGENT cannot be empty".to_string()));
        }

        Ok(())
    }
}
