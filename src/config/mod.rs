use anyhow::{Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use duration_serde::duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub instructions: InstructionsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for request bodies; uploaded images travel inline
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

/// Remote instruction document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionsConfig {
    /// Share URL of the policy document (`.../document/d/<id>/...`)
    #[serde(default)]
    pub document_url: String,
    /// Scheme and host the plain-text export is requested from
    #[serde(default = "default_export_base_url")]
    pub export_base_url: String,
    #[serde(default = "default_instructions_ttl", with = "duration")]
    pub ttl: Duration,
    #[serde(default = "default_fetch_timeout", with = "duration")]
    pub fetch_timeout: Duration,
    /// Returned when nothing was ever fetched successfully
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
    /// How many characters of the document are embedded in each prompt
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
}

/// Language model API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Model used when either trademark carries an image
    #[serde(default = "default_llm_vision_model")]
    pub vision_model: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f64,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_timeout", with = "duration")]
    pub request_timeout: Duration,
}

/// Completed-analysis retention for exports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_store_capacity")]
    pub store_capacity: usize,
    #[serde(default = "default_store_ttl", with = "duration")]
    pub store_ttl: Duration,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_request_bytes() -> usize {
    DEFAULT_MAX_REQUEST_BYTES
}

// Instruction defaults
fn default_export_base_url() -> String {
    DEFAULT_DOCUMENT_EXPORT_BASE_URL.to_string()
}

fn default_instructions_ttl() -> Duration {
    Duration::from_secs(DEFAULT_INSTRUCTIONS_TTL_SECS)
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_INSTRUCTIONS_FETCH_TIMEOUT_SECS)
}

fn default_fallback_message() -> String {
    DEFAULT_INSTRUCTIONS_FALLBACK.to_string()
}

fn default_max_prompt_chars() -> usize {
    DEFAULT_MAX_PROMPT_CHARS
}

// Language model defaults
fn default_llm_base_url() -> String {
    DEFAULT_LLM_BASE_URL.to_string()
}

fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

fn default_llm_vision_model() -> String {
    DEFAULT_LLM_VISION_MODEL.to_string()
}

fn default_llm_temperature() -> f64 {
    DEFAULT_LLM_TEMPERATURE
}

fn default_llm_max_tokens() -> u32 {
    DEFAULT_LLM_MAX_TOKENS
}

fn default_llm_timeout() -> Duration {
    Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS)
}

// Store defaults
fn default_store_capacity() -> usize {
    DEFAULT_STORE_CAPACITY
}

fn default_store_ttl() -> Duration {
    Duration::from_secs(DEFAULT_STORE_TTL_SECS)
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

impl Default for InstructionsConfig {
    fn default() -> Self {
        Self {
            document_url: String::new(),
            export_base_url: default_export_base_url(),
            ttl: default_instructions_ttl(),
            fetch_timeout: default_fetch_timeout(),
            fallback_message: default_fallback_message(),
            max_prompt_chars: default_max_prompt_chars(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            vision_model: default_llm_vision_model(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            request_timeout: default_llm_timeout(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            store_capacity: default_store_capacity(),
            store_ttl: default_store_ttl(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the TOML file (if present), then the
    /// legacy environment variables, then `TM_ANALYZER_<SECTION>__<KEY>`.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if std::path::Path::new(config_file).exists() {
            figment = figment.merge(Toml::file(config_file));
            info!("Reading config file: {}", config_file);
        } else {
            info!("Config file {} not found, using defaults", config_file);
        }

        let mut config: Self = figment.extract()?;
        config.apply_legacy_env(|key| std::env::var(key).ok());

        let config: Self = Figment::from(Serialized::defaults(config))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `GOOGLE_DOC_URL`, `OPENAI_API_KEY` and `PORT` when set.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(LEGACY_DOCUMENT_URL_VAR).filter(|v| !v.is_empty()) {
            self.instructions.document_url = url;
        }
        if let Some(key) = lookup(LEGACY_API_KEY_VAR).filter(|v| !v.is_empty()) {
            self.llm.api_key = key;
        }
        if let Some(port) = lookup(LEGACY_PORT_VAR) {
            match port.parse() {
                Ok(port) => self.web.port = port,
                Err(_) => warn!("Ignoring invalid {} value: {}", LEGACY_PORT_VAR, port),
            }
        }
    }

    /// Reject values that would make the service misbehave at runtime
    pub fn validate(&self) -> Result<()> {
        if self.analysis.store_capacity == 0 {
            bail!("analysis.store_capacity must be greater than zero");
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            bail!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            );
        }
        if self.llm.max_tokens == 0 {
            bail!("llm.max_tokens must be greater than zero");
        }
        if self.instructions.max_prompt_chars == 0 {
            bail!("instructions.max_prompt_chars must be greater than zero");
        }
        Ok(())
    }

    /// Log settings that leave the service running in degraded mode
    pub fn warn_on_degraded_settings(&self) {
        if self.llm.api_key.is_empty() {
            warn!(
                "No language model API key configured ({} / llm.api_key); every comparison will return the default record",
                LEGACY_API_KEY_VAR
            );
        }
        if self.instructions.document_url.is_empty() {
            warn!(
                "No instruction document configured ({} / instructions.document_url); prompts will carry the fallback text",
                LEGACY_DOCUMENT_URL_VAR
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.web.port, 5000);
        assert_eq!(config.instructions.ttl, Duration::from_secs(3600));
        assert_eq!(config.instructions.max_prompt_chars, 2000);
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.llm.max_tokens, 2000);
    }

    #[test]
    fn test_legacy_env_overrides() {
        let mut config = Config::default();
        config.apply_legacy_env(lookup_from(&[
            ("GOOGLE_DOC_URL", "https://docs.google.com/document/d/abc/edit"),
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "8081"),
        ]));

        assert_eq!(
            config.instructions.document_url,
            "https://docs.google.com/document/d/abc/edit"
        );
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.web.port, 8081);
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let mut config = Config::default();
        config.apply_legacy_env(lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(config.web.port, DEFAULT_PORT);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.analysis.store_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_sections_with_human_durations() {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [instructions]
                document_url = "https://docs.google.com/document/d/xyz/edit"
                ttl = "15m"

                [analysis]
                store_capacity = 8
                store_ttl = "2h"
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.instructions.ttl, Duration::from_secs(15 * 60));
        assert_eq!(config.analysis.store_capacity, 8);
        assert_eq!(config.analysis.store_ttl, Duration::from_secs(2 * 3600));
        // untouched sections keep their defaults
        assert_eq!(config.llm.base_url, DEFAULT_LLM_BASE_URL);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_from_file("/nonexistent/tm-analyzer.toml").unwrap();
        assert_eq!(config.analysis.store_capacity, DEFAULT_STORE_CAPACITY);
    }
}
