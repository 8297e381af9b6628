//! Gateway error types

/// Fallback text when the server gives no usable message
pub const DEFAULT_SAVE_MESSAGE: &str = "An error occurred while saving sampling rules";

/// Remote persistence errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Network or transport failure
    #[error("request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("server rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message derived from the response body
        message: String,
    },

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),

    /// Request did not complete in time
    #[error("request timed out after {duration_secs}s")]
    Timeout {
        /// Configured timeout
        duration_secs: u64,
    },

    /// Gateway misconfigured
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Create rejection error
    #[inline]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Check if retrying the same request may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Decode(_) | Self::Config(_) => false,
        }
    }

    /// Text suitable for a user-facing notification
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            _ => DEFAULT_SAVE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(GatewayError::Transport("reset".into()).is_retryable());
        assert!(GatewayError::Timeout { duration_secs: 5 }.is_retryable());
        assert!(GatewayError::rejected(503, "down").is_retryable());
        assert!(!GatewayError::rejected(400, "bad").is_retryable());
        assert!(!GatewayError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn user_message_prefers_server_text() {
        assert_eq!(GatewayError::rejected(400, "Too many rules").user_message(), "Too many rules");
        assert_eq!(
            GatewayError::Transport("reset".into()).user_message(),
            DEFAULT_SAVE_MESSAGE
        );
    }
}
