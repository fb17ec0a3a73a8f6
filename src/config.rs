// src/config.rs
use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
const MIN_SESSION_SECRET_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub gemini: GeminiConfig,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub max_upload_bytes: usize,
    pub extraction_timeout: Duration,
    pub admin_key: Option<String>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("gemini", &self.gemini)
            .field("session_ttl", &self.session_ttl)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("extraction_timeout", &self.extraction_timeout)
            .field("admin_key_set", &self.admin_key.is_some())
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Reads configuration from the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;
        let session_secret =
            get("SESSION_SECRET").ok_or(ConfigError::Missing("SESSION_SECRET"))?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "SESSION_SECRET",
                reason: format!("must be at least {MIN_SESSION_SECRET_LEN} bytes"),
            });
        }

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: format!("{e}"),
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let log_format = match get("LOG_FORMAT").map(|v| v.to_lowercase()).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    reason: format!("expected text or json, got {other}"),
                });
            }
        };

        Ok(Self {
            bind_addr,
            gemini: GeminiConfig {
                api_key,
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                base_url: get("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(parse_number(&get, "GEMINI_TIMEOUT_SECS", 60)?),
            },
            session_secret,
            session_ttl: Duration::from_secs(parse_number(&get, "SESSION_TTL_SECS", 86_400)?),
            max_upload_bytes: usize::try_from(parse_number(
                &get,
                "MAX_UPLOAD_BYTES",
                32 * 1024 * 1024,
            )?)
            .map_err(|e| ConfigError::Invalid {
                key: "MAX_UPLOAD_BYTES",
                reason: e.to_string(),
            })?,
            extraction_timeout: Duration::from_secs(parse_number(
                &get,
                "EXTRACTION_TIMEOUT_SECS",
                30,
            )?),
            admin_key: get("ADMIN_KEY"),
            log_format,
        })
    }
}

fn parse_number<G>(get: &G, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) => Err(ConfigError::Invalid {
                key,
                reason: "must be greater than zero".to_string(),
            }),
            Ok(n) => Ok(n),
            Err(e) => Err(ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("GEMINI_API_KEY", "test-key"),
        ("SESSION_SECRET", "0123456789abcdef0123"),
    ];

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let cfg = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(cfg.gemini.model, "gemini-pro");
        assert_eq!(cfg.gemini.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(cfg.gemini.timeout, Duration::from_secs(60));
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert_eq!(cfg.max_upload_bytes, 32 * 1024 * 1024);
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert!(cfg.admin_key.is_none());
    }

    #[test]
    fn missing_api_key_fails() {
        let err = Config::from_lookup(lookup(&[("SESSION_SECRET", "0123456789abcdef")]))
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::Missing("GEMINI_API_KEY"));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("SESSION_SECRET", "   "),
        ]))
        .err()
        .unwrap();
        assert_eq!(err, ConfigError::Missing("SESSION_SECRET"));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("SESSION_SECRET", "short"),
        ]))
        .err()
        .unwrap();
        assert!(matches!(err, ConfigError::Invalid { key: "SESSION_SECRET", .. }));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("GEMINI_MODEL", "gemini-1.5-flash"),
            ("GEMINI_BASE_URL", "http://localhost:9999/v1beta/"),
            ("GEMINI_TIMEOUT_SECS", "5"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("LOG_FORMAT", "JSON"),
            ("ADMIN_KEY", "admin"),
        ]);
        let cfg = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.gemini.model, "gemini-1.5-flash");
        assert_eq!(cfg.gemini.base_url, "http://localhost:9999/v1beta");
        assert_eq!(cfg.gemini.timeout, Duration::from_secs(5));
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.admin_key.as_deref(), Some("admin"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GEMINI_TIMEOUT_SECS", "0"));
        let err = Config::from_lookup(lookup(&pairs)).err().unwrap();
        assert!(matches!(err, ConfigError::Invalid { key: "GEMINI_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn upload_limit_is_parsed_and_bounded() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("MAX_UPLOAD_BYTES", "1048576"));
        let cfg = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.max_upload_bytes, 1024 * 1024);

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("MAX_UPLOAD_BYTES", "340282366920938463463374607431768211456"));
        let err = Config::from_lookup(lookup(&pairs)).err().unwrap();
        assert!(matches!(err, ConfigError::Invalid { key: "MAX_UPLOAD_BYTES", .. }));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("test-key"));
        assert!(!rendered.contains("0123456789abcdef0123"));
    }
}
