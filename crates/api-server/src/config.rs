//! HTTP server configuration

use std::env;
use tracing::warn;

/// 2 GiB
const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to bind
    pub addr: String,
    /// Allowed CORS origins; empty allows any origin
    pub cors_allowed_origins: Vec<String>,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8000".to_string(),
            cors_allowed_origins: Vec::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `API_SERVER_ADDR`: bind address (default: "0.0.0.0:8000")
    /// - `CORS_ALLOWED_ORIGINS`: comma separated origins (default: any)
    /// - `MAX_UPLOAD_BYTES`: request body limit (default: 2 GiB)
    #[must_use = "creates config from environment variables"]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid MAX_UPLOAD_BYTES={:?}", raw);
                defaults.max_upload_bytes
            }),
            None => defaults.max_upload_bytes,
        };

        Self {
            addr: lookup("API_SERVER_ADDR").unwrap_or(defaults.addr),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            max_upload_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr, "0.0.0.0:8000");
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn test_origins_and_limits() {
        let config = ServerConfig::from_lookup(|key| match key {
            "API_SERVER_ADDR" => Some("127.0.0.1:9000".to_string()),
            "CORS_ALLOWED_ORIGINS" => {
                Some("http://localhost:3000, https://example.org,,".to_string())
            }
            "MAX_UPLOAD_BYTES" => Some("1048576".to_string()),
            _ => None,
        });
        assert_eq!(config.addr, "127.0.0.1:9000");
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "https://example.org"]
        );
        assert_eq!(config.max_upload_bytes, 1_048_576);
    }

    #[test]
    fn test_bad_limit_falls_back() {
        let config = ServerConfig::from_lookup(|key| {
            (key == "MAX_UPLOAD_BYTES").then(|| "lots".to_string())
        });
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }
}
