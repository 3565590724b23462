//! Errors surfaced by the translation service and the request handlers.

use thiserror::Error;

use crate::deepl::ProviderError;

/// Errors that can occur while handling a translation request
#[derive(Error, Debug)]
pub enum TranslateError {
    /// The request was incomplete or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The translation provider could not be reached
    #[error("Provider connection error: {0}")]
    ProviderConnection(String),

    /// The provider-side usage limit has been reached
    #[error("Provider quota exceeded: {0}")]
    ProviderQuotaExceeded(String),

    /// The provider rejected the request (e.g. unsupported language pair)
    #[error("Provider request error: {0}")]
    ProviderRequest(String),

    /// Anything else, including storage failures
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

/// Stable name of each error kind, used in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    ProviderConnection,
    ProviderQuotaExceeded,
    ProviderRequest,
    Unexpected,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::ProviderConnection => "provider_connection",
            Self::ProviderQuotaExceeded => "provider_quota_exceeded",
            Self::ProviderRequest => "provider_request",
            Self::Unexpected => "unexpected",
        }
    }
}

impl TranslateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::ProviderConnection(_) => ErrorKind::ProviderConnection,
            Self::ProviderQuotaExceeded(_) => ErrorKind::ProviderQuotaExceeded,
            Self::ProviderRequest(_) => ErrorKind::ProviderRequest,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// The message shown to the user for this error
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidArgument(detail) => {
                format!("The translation request is incomplete: {}", detail)
            }
            Self::ProviderConnection(detail) => {
                format!("Could not connect to the translation service: {}", detail)
            }
            Self::ProviderQuotaExceeded(detail) => {
                format!("The translation quota has been reached: {}", detail)
            }
            Self::ProviderRequest(detail) => {
                format!("Invalid language combination: {}", detail)
            }
            Self::Unexpected(error) => format!("An unexpected error occurred: {}", error),
        }
    }
}

impl From<ProviderError> for TranslateError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Connection(message) => Self::ProviderConnection(message),
            ProviderError::QuotaExceeded(message) => Self::ProviderQuotaExceeded(message),
            ProviderError::Request { message, .. } => Self::ProviderRequest(message),
            ProviderError::InvalidResponse(message) => Self::ProviderRequest(message),
        }
    }
}
