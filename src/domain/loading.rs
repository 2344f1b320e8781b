use std::fmt;

use crate::client::NewsApiError;

/// Why a feed failed to load, without the underlying cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Network,
    Decoding,
    NoData,
    RateLimited,
    ApiKeyInvalid,
}

impl FailureKind {
    /// Whether tapping "retry" has a chance of succeeding without a
    /// configuration change.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            FailureKind::Network | FailureKind::NoData | FailureKind::RateLimited
        )
    }

    pub fn message(self) -> &'static str {
        match self {
            FailureKind::InvalidUrl => "Invalid request URL",
            FailureKind::Network => "Network error",
            FailureKind::Decoding => "Failed to decode response",
            FailureKind::NoData => "No data received",
            FailureKind::RateLimited => "API rate limit exceeded. Please try again later.",
            FailureKind::ApiKeyInvalid => "Invalid API key",
        }
    }
}

impl From<&NewsApiError> for FailureKind {
    fn from(err: &NewsApiError) -> Self {
        match err {
            NewsApiError::InvalidUrl(_) => FailureKind::InvalidUrl,
            NewsApiError::Network(_) => FailureKind::Network,
            NewsApiError::Decoding(_) => FailureKind::Decoding,
            NewsApiError::NoData => FailureKind::NoData,
            NewsApiError::RateLimitExceeded => FailureKind::RateLimited,
            NewsApiError::ApiKeyInvalid => FailureKind::ApiKeyInvalid,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Lifecycle of a feed's first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(FailureKind),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadingState::Failed(_))
    }

    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            LoadingState::Failed(kind) => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_states_keep_their_kind() {
        let rate = LoadingState::Failed(FailureKind::RateLimited);
        let net = LoadingState::Failed(FailureKind::Network);
        assert_ne!(rate, net);
        assert!(rate.is_failed() && net.is_failed());
        assert_eq!(rate.failure(), Some(FailureKind::RateLimited));
        assert_eq!(LoadingState::Loaded.failure(), None);
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(FailureKind::Network.is_retryable());
        assert!(FailureKind::RateLimited.is_retryable());
        assert!(!FailureKind::ApiKeyInvalid.is_retryable());
        assert!(!FailureKind::Decoding.is_retryable());
    }

    #[test]
    fn test_kind_from_error() {
        assert_eq!(
            FailureKind::from(&NewsApiError::RateLimitExceeded),
            FailureKind::RateLimited
        );
        assert_eq!(
            FailureKind::from(&NewsApiError::Decoding("bad json".into())),
            FailureKind::Decoding
        );
    }
}
