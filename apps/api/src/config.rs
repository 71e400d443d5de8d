use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_ANTHROPIC_API_URL;

/// Environment variable holding the generation service credential.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Application configuration loaded from environment variables.
/// Fails at startup on malformed values. The API credential is not part of
/// it: see [`ApiKeySource`].
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub anthropic_api_url: String,
    pub llm_timeout_secs: u64,
    /// Total attempts per generation call, including the first one.
    pub llm_max_attempts: u32,
    pub llm_retry_backoff_ms: u64,
    pub max_body_bytes: usize,
    /// Optional file replacing the built-in system instruction.
    pub system_prompt_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, applying defaults for
    /// anything the lookup does not provide.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            anthropic_api_url: lookup("ANTHROPIC_API_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_API_URL.to_string()),
            llm_timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", 60)?,
            llm_max_attempts: parse_or(&lookup, "LLM_MAX_ATTEMPTS", 2)?,
            llm_retry_backoff_ms: parse_or(&lookup, "LLM_RETRY_BACKOFF_MS", 500)?,
            max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", 64 * 1024)?,
            system_prompt_path: lookup("SYSTEM_PROMPT_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };

        if config.llm_timeout_secs == 0 {
            bail!("LLM_TIMEOUT_SECS must be greater than zero");
        }
        if config.llm_max_attempts == 0 {
            bail!("LLM_MAX_ATTEMPTS must be at least 1");
        }

        Ok(config)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

/// Where the generation API key comes from. Resolved on every request, so a
/// missing key surfaces as a per-request error instead of a startup failure.
#[derive(Clone)]
pub enum ApiKeySource {
    /// Read the named process environment variable at call time.
    Env(&'static str),
    /// A key fixed at construction; tests use it to run without touching the environment.
    #[cfg_attr(not(test), allow(dead_code))]
    Fixed(Option<String>),
}

impl ApiKeySource {
    /// Returns the key, treating an empty value as absent.
    pub fn resolve(&self) -> Option<String> {
        let key = match self {
            ApiKeySource::Env(var) => std::env::var(var).ok(),
            ApiKeySource::Fixed(key) => key.clone(),
        };
        key.filter(|k| !k.trim().is_empty())
    }
}

impl fmt::Debug for ApiKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKeySource::Env(var) => f.debug_tuple("Env").field(var).finish(),
            ApiKeySource::Fixed(key) => f
                .debug_tuple("Fixed")
                .field(&key.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.anthropic_api_url, DEFAULT_ANTHROPIC_API_URL);
        assert_eq!(config.llm_timeout_secs, 60);
        assert_eq!(config.llm_max_attempts, 2);
        assert_eq!(config.llm_retry_backoff_ms, 500);
        assert_eq!(config.max_body_bytes, 65536);
        assert!(config.system_prompt_path.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "3000"),
            ("ANTHROPIC_API_URL", "http://127.0.0.1:9999"),
            ("LLM_TIMEOUT_SECS", "15"),
            ("LLM_MAX_ATTEMPTS", "1"),
            ("SYSTEM_PROMPT_PATH", "/etc/sif/prompt.txt"),
        ]))
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.anthropic_api_url, "http://127.0.0.1:9999");
        assert_eq!(config.llm_timeout_secs, 15);
        assert_eq!(config.llm_max_attempts, 1);
        assert_eq!(
            config.system_prompt_path,
            Some(PathBuf::from("/etc/sif/prompt.txt"))
        );
    }

    #[test]
    fn test_invalid_port_fails() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_zero_attempts_fails() {
        assert!(Config::from_lookup(lookup_from(&[("LLM_MAX_ATTEMPTS", "0")])).is_err());
    }

    #[test]
    fn test_fixed_key_blank_is_absent() {
        assert_eq!(ApiKeySource::Fixed(None).resolve(), None);
        assert_eq!(ApiKeySource::Fixed(Some("  ".to_string())).resolve(), None);
        assert_eq!(
            ApiKeySource::Fixed(Some("sk-test".to_string())).resolve(),
            Some("sk-test".to_string())
        );
    }

    #[test]
    fn test_debug_redacts_fixed_key() {
        let rendered = format!("{:?}", ApiKeySource::Fixed(Some("sk-secret".to_string())));
        assert!(!rendered.contains("sk-secret"));
    }
}
