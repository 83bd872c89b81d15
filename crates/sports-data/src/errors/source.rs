use std::fmt;

use thiserror::Error;

use crate::http::TransportError;
use crate::models::ProviderId;

/// Why a single provider attempt failed.
///
/// Carries only a summary: no URLs, cause chains or backtraces.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FailureCause {
    /// The provider returned an error.
    Provider(String),
    /// The provider call exceeded the attempt timeout.
    Timeout,
    /// No rate-limit token became available within the wait budget.
    RateLimited,
    /// The provider answered with an empty or invalid result.
    Malformed(String),
    /// The provider declares the capability but not this operation.
    NotSupported,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(message) => write!(f, "{}", message),
            Self::Timeout => write!(f, "timed out"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::Malformed(message) => write!(f, "malformed result: {}", message),
            Self::NotSupported => write!(f, "operation not supported"),
        }
    }
}

/// One provider's failed attempt within a resolution.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("[{provider}] {cause}")]
pub struct SourceError {
    pub provider: ProviderId,
    pub cause: FailureCause,
}

impl SourceError {
    pub fn new(provider: ProviderId, cause: FailureCause) -> Self {
        Self { provider, cause }
    }
}

/// Errors returned by provider adapters.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The adapter has no implementation for this operation.
    #[error("Operation not supported: {operation}")]
    NotSupported { operation: &'static str },

    /// The upstream has no record for the requested entity.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The upstream answered but the answer was unusable.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The HTTP exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ProviderError {
    /// Collapses the adapter error into a boundary-safe cause.
    pub fn into_cause(self) -> FailureCause {
        match self {
            Self::NotSupported { .. } => FailureCause::NotSupported,
            Self::NotFound(what) => FailureCause::Provider(format!("not found: {}", what)),
            Self::Upstream(message) => FailureCause::Provider(message),
            Self::Transport(e) => e.summary(),
        }
    }
}
