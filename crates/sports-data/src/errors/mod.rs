//! Error types for the sports data crate.
//!
//! This module provides:
//! - [`SportsDataError`]: the only error that crosses the resolution boundary
//! - [`ErrorKind`]: a stable classification callers can branch on
//! - [`SourceError`] / [`FailureCause`]: one provider's failed attempt
//! - [`ProviderError`]: what adapters return from their operation methods

mod source;

pub use source::{FailureCause, ProviderError, SourceError};

use std::time::Duration;

use thiserror::Error;

use crate::provider::Capability;

/// Stable, enumerable kind of a boundary failure.
///
/// Lets a caller tell "bad input" from "system overloaded" from "no provider
/// had the data" without matching on messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Validation,
    AdmissionTimeout,
    AllSourcesFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::AdmissionTimeout => "ADMISSION_TIMEOUT",
            Self::AllSourcesFailed => "ALL_SOURCES_FAILED",
        }
    }
}

/// Errors surfaced by [`SportsDataContext::resolve_operation`](crate::SportsDataContext::resolve_operation).
///
/// The type is `Clone` so a single-flight outcome can be handed to every
/// waiter of the same key.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SportsDataError {
    /// Malformed input, rejected before any provider is contacted.
    #[error("Invalid request: {message}")]
    Validation {
        /// Description of the rejected input
        message: String,
    },

    /// Every eligible provider failed, or none supports the capability.
    ///
    /// `failures` is in attempt order and is empty when no provider is
    /// eligible.
    #[error("All sources failed for {capability}. Tried: {}", tried(.failures))]
    AllSourcesFailed {
        /// The capability the request needed
        capability: Capability,
        /// One entry per attempted provider
        failures: Vec<SourceError>,
    },

    /// The concurrency governor could not admit the call in time.
    #[error("Too many concurrent requests (waited {waited:?})")]
    AdmissionTimeout {
        /// How long the caller waited before giving up
        waited: Duration,
    },
}

fn tried(failures: &[SourceError]) -> String {
    if failures.is_empty() {
        return "none".to_string();
    }
    failures
        .iter()
        .map(|f| f.provider.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SportsDataError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::AllSourcesFailed { .. } => ErrorKind::AllSourcesFailed,
            Self::AdmissionTimeout { .. } => ErrorKind::AdmissionTimeout,
        }
    }

    /// Provider failures collected during resolution, empty for other kinds.
    pub fn failures(&self) -> &[SourceError] {
        match self {
            Self::AllSourcesFailed { failures, .. } => failures,
            _ => &[],
        }
    }
}
