//! Gateway configuration

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};

/// HTTP gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server base URL, e.g. `https://monitor.example.com`
    pub base_url: String,
    /// Bearer token sent with every request
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header
    pub user_agent: String,
}

impl GatewayConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With auth token
    #[inline]
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// With timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Reject configurations the gateway cannot use
    ///
    /// # Errors
    /// `GatewayError::Config` for a non-HTTP base URL or a zero timeout.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(GatewayError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(GatewayError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000".to_string(),
            auth_token: None,
            timeout_secs: 30,
            user_agent: format!("dsr/{}", crate::VERSION),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(GatewayConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(GatewayConfig::new().with_base_url("ftp://x").validate().is_err());
        assert!(GatewayConfig::new().with_timeout_secs(0).validate().is_err());
    }

    #[test]
    fn token_is_never_serialized() {
        let config = GatewayConfig::new().with_auth_token("secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn partial_deserialize_uses_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"base_url": "https://monitor.example.com"}"#).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.base_url, "https://monitor.example.com");
    }
}
