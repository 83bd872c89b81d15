//! The resolution boundary.
//!
//! [`SportsDataContext`] owns every piece of shared state (registry, rate
//! limiter, cache, governor) and is the only entry point callers need.
//!
//! # Example
//!
//! ```ignore
//! let context = SportsDataContext::builder(SportsDataConfig::from_env())
//!     .provider(Arc::new(EspnProvider::new(http.clone())))
//!     .provider(Arc::new(NcaaProvider::new(http)))
//!     .build();
//!
//! let rankings = context
//!     .resolve_operation(
//!         Capability::Rankings,
//!         &Operation::Rankings { poll: PollType::Ap, season: 0, week: 0 },
//!     )
//!     .await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use tokio::task::JoinError;

use crate::cache::{CacheKey, Clock, SystemClock, TieredCache};
use crate::config::SportsDataConfig;
use crate::errors::SportsDataError;
use crate::governor::ConcurrencyGovernor;
use crate::models::{DataValue, Operation, ProviderId};
use crate::provider::{Capability, SportsDataProvider};
use crate::registry::{ProviderRegistry, RateLimiter};
use crate::resolver::{Resolver, ResolverSettings};
use crate::validation;

/// A value returned across the boundary, with provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedValue {
    pub value: DataValue,
    /// Provider that produced the value, also when it was served from cache.
    pub provider: ProviderId,
    pub from_cache: bool,
    /// When the provider answered.
    pub fetched_at: DateTime<Utc>,
}

/// Builder for [`SportsDataContext`]. Providers can only be registered here.
pub struct SportsDataContextBuilder {
    config: SportsDataConfig,
    providers: Vec<Arc<dyn SportsDataProvider>>,
    clock: Option<Arc<dyn Clock>>,
}

impl SportsDataContextBuilder {
    /// Register a provider. Registration order breaks priority ties.
    pub fn provider(mut self, provider: Arc<dyn SportsDataProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Clock used for cache expiry. Defaults to the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> SportsDataContext {
        let config = self.config;

        let registry = ProviderRegistry::with_overrides(
            self.providers,
            &config.priorities,
            &config.rate_limits,
        );
        let rate_limiter = RateLimiter::from_descriptors(registry.descriptors());
        let resolver = Resolver::new(
            Arc::new(registry),
            Arc::new(rate_limiter),
            ResolverSettings {
                provider_timeout: config.provider_timeout,
                rate_limit_wait: config.rate_limit_wait,
            },
        );

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let cache = TieredCache::new(config.cache.clone(), clock);
        let governor = ConcurrencyGovernor::new(config.max_concurrency);

        info!(
            "Sports data context ready: {} providers, max {} concurrent calls",
            resolver.registry().len(),
            governor.limit()
        );

        SportsDataContext {
            resolver: Arc::new(resolver),
            cache,
            governor,
            config,
        }
    }
}

/// Shared resolution context. Create one per process and share it.
pub struct SportsDataContext {
    resolver: Arc<Resolver>,
    cache: TieredCache,
    governor: ConcurrencyGovernor,
    config: SportsDataConfig,
}

impl SportsDataContext {
    pub fn builder(config: SportsDataConfig) -> SportsDataContextBuilder {
        SportsDataContextBuilder {
            config,
            providers: Vec::new(),
            clock: None,
        }
    }

    /// Resolve `operation` for `capability`.
    ///
    /// Steps: validate, wait for admission, serve from cache if fresh,
    /// otherwise resolve once per key across concurrent callers and cache
    /// the result. The admission slot is held until this returns.
    pub async fn resolve_operation(
        &self,
        capability: Capability,
        operation: &Operation,
    ) -> Result<ResolvedValue, SportsDataError> {
        validation::validate(capability, operation)?;

        let _permit = self.governor.admit(self.config.admission_timeout).await?;

        let key = CacheKey::for_operation(operation);
        let resolver = Arc::clone(&self.resolver);
        let owned = operation.clone();
        let fetch = async move {
            let resolved = resolver.resolve(&owned, capability).await?;
            Ok::<_, SportsDataError>((resolved.value, resolved.provider))
        };
        let on_abort = move |e: JoinError| {
            error!("Resolution task for {} aborted: {}", capability, e);
            SportsDataError::AllSourcesFailed {
                capability,
                failures: Vec::new(),
            }
        };

        let lookup = self
            .cache
            .get_or_resolve(&key, operation.ttl_class(), fetch, on_abort)
            .await?;

        debug!(
            "{} answered by '{}'{}",
            operation,
            lookup.entry.provider,
            if lookup.from_cache { " (cached)" } else { "" }
        );

        Ok(ResolvedValue {
            value: lookup.entry.payload.clone(),
            provider: lookup.entry.provider.clone(),
            from_cache: lookup.from_cache,
            fetched_at: lookup.entry.created_at,
        })
    }

    /// [`resolve_operation`](Self::resolve_operation) with the capability
    /// the operation implies.
    pub async fn resolve(&self, operation: &Operation) -> Result<ResolvedValue, SportsDataError> {
        self.resolve_operation(operation.capability(), operation)
            .await
    }

    pub fn cache(&self) -> &TieredCache {
        &self.cache
    }

    pub fn governor(&self) -> &ConcurrencyGovernor {
        &self.governor
    }

    pub fn registry(&self) -> &ProviderRegistry {
        self.resolver.registry()
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        self.resolver.rate_limiter()
    }

    pub fn config(&self) -> &SportsDataConfig {
        &self.config
    }
}
