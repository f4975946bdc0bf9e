//! Runtime settings loaded from the environment (and `.env`)

use crate::error::AdvisorError;
use crate::Result;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "deepseek-r1-distill-llama-70b";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Settings {
    /// May be empty; the model client refuses to call out without it
    pub groq_api_key: String,
    pub model: String,
    pub base_url: String,
    pub port: u16,
    pub model_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT").or_else(|| non_empty("API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| AdvisorError::Config(format!("invalid port {:?}: {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match non_empty("MODEL_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                AdvisorError::Config(format!("invalid MODEL_TIMEOUT_SECS {:?}: {}", raw, e))
            })?,
            None => DEFAULT_MODEL_TIMEOUT_SECS,
        };

        Ok(Self {
            groq_api_key: lookup("GROQ_API_KEY").unwrap_or_default().trim().to_string(),
            model: non_empty("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty("GROQ_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            port,
            model_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
