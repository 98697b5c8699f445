//! Backend connection configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GatehouseError, Result};

/// Connection settings for the hosted auth/data service.
///
/// Both values are opaque to the core: the URL is the service's base
/// endpoint and the key is the public (anonymous) API key passed on every
/// request. Neither carries any semantic role beyond reaching the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Validates and normalizes the configuration: the URL must use an
    /// http(s) scheme and include a host; a trailing slash is dropped.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when either value is empty or the URL is
    /// malformed.
    pub fn normalized(&self) -> Result<Self> {
        let url = normalize_base_url(&self.url)?;
        if self.anon_key.trim().is_empty() {
            return Err(GatehouseError::config("backend anon key must not be empty"));
        }
        Ok(Self {
            url,
            anon_key: self.anon_key.trim().to_string(),
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(GatehouseError::config("backend url must not be empty"));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(GatehouseError::config(
            "backend url must use http:// or https://",
        ));
    }
    let Some((_, remainder)) = trimmed.split_once("://") else {
        return Err(GatehouseError::config("backend url is malformed"));
    };
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(GatehouseError::config("backend url must include a host"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_drops_trailing_slash() {
        let config = BackendConfig::new(" https://gate.example.com/ ", "anon-key");
        let normalized = config.normalized().expect("valid config");
        assert_eq!(normalized.url, "https://gate.example.com");
    }

    #[test]
    fn test_rejects_missing_scheme() {
        let config = BackendConfig::new("gate.example.com", "anon-key");
        let err = config.normalized().expect_err("expected config error");
        assert!(err.is_config());
    }

    #[test]
    fn test_rejects_empty_key() {
        let config = BackendConfig::new("https://gate.example.com", "  ");
        assert!(config.normalized().is_err());
    }
}
