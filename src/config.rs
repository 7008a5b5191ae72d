use anyhow::{Context, Result};
use serde::Deserialize;

use crate::pipeline::LlmFallback;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_EMAIL_DAYS_BACK: u32 = 30;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// `None` when no OAuth client credentials are configured
    pub gmail: Option<GmailConfig>,
    pub pipeline: PipelineConfig,
    pub ollama: OllamaConfig,
    pub dry_run: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GmailConfig {
    pub credentials_path: String,
    pub token_cache_path: String,
    pub max_results: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    pub confidence_threshold: f64,
    pub email_days_back: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    pub enabled: bool,
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub delay_ms: u64,
    pub fallback: LlmFallback,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            email_days_back: DEFAULT_EMAIL_DAYS_BACK,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        OllamaConfig {
            enabled: false,
            url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout_secs: 60,
            delay_ms: 100,
            fallback: LlmFallback::default(),
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => value.trim().eq_ignore_ascii_case("true"),
        Err(_) => default,
    }
}

fn env_parsed<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value.trim().parse::<T>()
            .with_context(|| format!("Invalid value for {}: '{}'", name, value)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Configuration loaded from environment variables (and `.env`)
    pub fn new() -> Result<Self> {
        let gmail = match std::env::var("GMAIL_CREDENTIALS_PATH") {
            Ok(credentials_path) => Some(GmailConfig {
                credentials_path,
                token_cache_path: std::env::var("GMAIL_TOKEN_CACHE_PATH")
                    .unwrap_or_else(|_| "./gmail-token-cache.json".to_string()),
                max_results: env_parsed("GMAIL_MAX_RESULTS", 50)?,
            }),
            Err(_) => {
                log::warn!("GMAIL_CREDENTIALS_PATH not set - sample emails will be used");
                None
            }
        };

        let defaults = OllamaConfig::default();

        Ok(Config {
            gmail,
            pipeline: PipelineConfig {
                confidence_threshold: env_parsed("CONFIDENCE_THRESHOLD", DEFAULT_CONFIDENCE_THRESHOLD)?,
                email_days_back: env_parsed("EMAIL_DAYS_BACK", DEFAULT_EMAIL_DAYS_BACK)?,
            },
            ollama: OllamaConfig {
                enabled: env_flag("USE_OLLAMA", false),
                url: std::env::var("OLLAMA_URL").unwrap_or(defaults.url),
                model: std::env::var("OLLAMA_MODEL").unwrap_or(defaults.model),
                timeout_secs: env_parsed("OLLAMA_TIMEOUT_SECS", defaults.timeout_secs)?,
                delay_ms: env_parsed("OLLAMA_DELAY_MS", defaults.delay_ms)?,
                fallback: match std::env::var("OLLAMA_FALLBACK") {
                    Ok(value) => LlmFallback::from_name(&value)
                        .with_context(|| format!("Invalid value for OLLAMA_FALLBACK: '{}'", value))?,
                    Err(_) => defaults.fallback,
                },
            },
            // Preview-only unless explicitly turned off
            dry_run: env_flag("DRY_RUN", true),
        })
    }

    /// Human-readable configuration issues. Empty when everything is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.gmail.is_none() {
            issues.push("GMAIL_CREDENTIALS_PATH is not set (live Gmail retrieval disabled)".to_string());
        }

        let threshold = self.pipeline.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            issues.push(format!("CONFIDENCE_THRESHOLD must be between 0 and 1 (got {})", threshold));
        }

        let days = self.pipeline.email_days_back;
        if !(1..=365).contains(&days) {
            issues.push(format!("EMAIL_DAYS_BACK must be between 1 and 365 (got {})", days));
        }

        if self.ollama.enabled && self.ollama.model.trim().is_empty() {
            issues.push("OLLAMA_MODEL must not be empty when USE_OLLAMA=true".to_string());
        }

        issues
    }
}
