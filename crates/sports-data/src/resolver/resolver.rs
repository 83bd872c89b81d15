use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use log::{debug, warn};

use crate::errors::{FailureCause, SourceError, SportsDataError};
use crate::models::{DataValue, Operation, ProviderId};
use crate::provider::Capability;
use crate::registry::{ProviderRegistry, RateLimiter, RegisteredProvider};

/// Per-attempt bounds.
#[derive(Clone, Copy, Debug)]
pub struct ResolverSettings {
    /// Upper bound on one provider call.
    pub provider_timeout: Duration,
    /// How long an attempt may wait for a rate-limit token.
    pub rate_limit_wait: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(30),
            rate_limit_wait: Duration::from_secs(5),
        }
    }
}

/// A successful resolution and the provider that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolutionResult {
    pub value: DataValue,
    pub provider: ProviderId,
}

/// Walks the eligible providers in priority order until one answers.
///
/// Providers are tried strictly one after another, each at most once per
/// call. Nothing carries over between calls: a provider that failed last
/// time is asked again next time.
pub struct Resolver {
    registry: Arc<ProviderRegistry>,
    rate_limiter: Arc<RateLimiter>,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        rate_limiter: Arc<RateLimiter>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            registry,
            rate_limiter,
            settings,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Resolve `operation` against the providers declaring `capability`.
    pub async fn resolve(
        &self,
        operation: &Operation,
        capability: Capability,
    ) -> Result<ResolutionResult, SportsDataError> {
        let providers = self.registry.eligible(capability);

        if providers.is_empty() {
            warn!("No provider supports {} (needed by {})", capability, operation);
            return Err(SportsDataError::AllSourcesFailed {
                capability,
                failures: Vec::new(),
            });
        }

        let mut failures = Vec::with_capacity(providers.len());

        for registered in providers {
            let provider = registered.descriptor.name.clone();

            match self.attempt(registered, operation).await {
                Ok(value) => {
                    debug!(
                        "Resolved {} via '{}' after {} failed attempts",
                        operation,
                        provider,
                        failures.len()
                    );
                    return Ok(ResolutionResult { value, provider });
                }
                Err(cause) => {
                    warn!(
                        "Provider '{}' failed for {}: {}, trying next",
                        provider, operation, cause
                    );
                    failures.push(SourceError::new(provider, cause));
                }
            }
        }

        Err(SportsDataError::AllSourcesFailed {
            capability,
            failures,
        })
    }

    async fn attempt(
        &self,
        registered: &RegisteredProvider,
        operation: &Operation,
    ) -> Result<DataValue, FailureCause> {
        let name = registered.descriptor.name.as_ref();

        if !self
            .rate_limiter
            .acquire(name, self.settings.rate_limit_wait)
            .await
        {
            return Err(FailureCause::RateLimited);
        }

        debug!("Calling provider '{}' for {}", name, operation);
        let call = AssertUnwindSafe(registered.provider.execute(operation)).catch_unwind();
        let value = match tokio::time::timeout(self.settings.provider_timeout, call).await {
            Err(_) => return Err(FailureCause::Timeout),
            Ok(Err(_)) => return Err(FailureCause::Provider("provider panicked".to_string())),
            Ok(Ok(Err(e))) => return Err(e.into_cause()),
            Ok(Ok(Ok(value))) => value,
        };

        value
            .check_well_formed(operation)
            .map_err(FailureCause::Malformed)?;
        Ok(value)
    }
}
