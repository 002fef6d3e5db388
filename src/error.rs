//! Error types and handling for the `CloseEscape` service

use thiserror::Error;

/// Main error type for the `CloseEscape` service
#[derive(Error, Debug)]
pub enum CloseEscapeError {
    /// Configuration-related errors (missing or rejected credentials included)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Failures reported by the generative model service
    #[error("Upstream error ({kind}): {message}")]
    Upstream {
        kind: UpstreamErrorKind,
        message: String,
    },
}

/// Classification of a failed call to the generative model service.
///
/// The upstream only hands back message strings, so the kind is derived by
/// pattern matching on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// The API key was rejected. Fatal, never retried.
    InvalidCredentials,
    /// The call timed out. The caller may retry.
    Timeout,
    /// The quota is exhausted. The caller should back off.
    QuotaExceeded,
    /// Anything else.
    Other,
}

impl UpstreamErrorKind {
    /// Classify an upstream failure message
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();

        if lowered.contains("api key not valid") || lowered.contains("api_key_invalid") {
            Self::InvalidCredentials
        } else if lowered.contains("timed out") || lowered.contains("timeout") {
            Self::Timeout
        } else if lowered.contains("quota") {
            Self::QuotaExceeded
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::Timeout => write!(f, "timeout"),
            Self::QuotaExceeded => write!(f, "quota exceeded"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl CloseEscapeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an upstream error, classifying it from its message
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        Self::Upstream {
            kind: UpstreamErrorKind::classify(&message),
            message,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CloseEscapeError::Config { .. } => "Server configuration error".to_string(),
            CloseEscapeError::Upstream { kind, .. } => match kind {
                UpstreamErrorKind::InvalidCredentials => {
                    "Server configuration error: Invalid API Key.".to_string()
                }
                UpstreamErrorKind::Timeout => {
                    "Request to AI service timed out. Please try again.".to_string()
                }
                UpstreamErrorKind::QuotaExceeded => {
                    "AI service quota exceeded. Please try again later.".to_string()
                }
                UpstreamErrorKind::Other => {
                    "Failed to get trip suggestions due to an internal server error.".to_string()
                }
            },
        }
    }
}
