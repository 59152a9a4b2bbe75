//! Page request error type shared by the batch fetcher and the loader.

/// Error returned by a single page request.
///
/// Stored as-is in the published load state, so it is `Clone` and carries
/// only owned strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Query parameters rejected before (or by) the endpoint.
    #[error("{message}")]
    Validation { message: String },
    /// Endpoint answered with a non-2xx status.
    #[error("{message}")]
    Api { status: u16, message: String },
    /// Transport-level failure (connect, DNS, timeout, reset).
    #[error("Network error: {message}")]
    Network { message: String },
    /// 2xx response whose body is not a page.
    #[error("invalid response body: {message}")]
    Decode { message: String },
    /// Request aborted because its session was superseded.
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn validation(message: impl Into<String>) -> Self {
        FetchError::Validation {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        FetchError::Network {
            message: message.into(),
        }
    }

    /// HTTP-like status for display (400 for validation, 500 for local failures).
    pub fn status(&self) -> u16 {
        match self {
            FetchError::Validation { .. } => 400,
            FetchError::Api { status, .. } => *status,
            FetchError::Network { .. } | FetchError::Decode { .. } => 500,
            FetchError::Cancelled => 499,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}
