//! Static provider registry.
//!
//! Providers are registered once at startup and kept in a list sorted by
//! priority. Lookups filter that list by capability, so the fallback order
//! for a request is fixed for the lifetime of the process.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use log::{debug, info};

use crate::models::ProviderId;
use crate::provider::{Capability, RateLimit, SportsDataProvider};

/// Immutable description of a registered provider.
#[derive(Clone, Debug)]
pub struct ProviderDescriptor {
    pub name: ProviderId,
    /// Lower values are tried first.
    pub priority: i32,
    pub capabilities: BTreeSet<Capability>,
    pub rate_limit: RateLimit,
    /// Position in registration order; breaks priority ties.
    pub registration_index: usize,
}

impl ProviderDescriptor {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// A provider together with its descriptor.
#[derive(Clone)]
pub struct RegisteredProvider {
    pub descriptor: ProviderDescriptor,
    pub provider: Arc<dyn SportsDataProvider>,
}

/// Provider registry, ordered by priority.
pub struct ProviderRegistry {
    providers: Vec<RegisteredProvider>,
}

impl ProviderRegistry {
    /// Build a registry from providers in registration order.
    pub fn new(providers: Vec<Arc<dyn SportsDataProvider>>) -> Self {
        Self::with_overrides(providers, &HashMap::new(), &HashMap::new())
    }

    /// Build a registry applying configured priority and rate-limit overrides
    /// (keyed by provider id).
    ///
    /// Sorting is stable, so providers with equal priority keep their
    /// registration order.
    pub fn with_overrides(
        providers: Vec<Arc<dyn SportsDataProvider>>,
        priorities: &HashMap<String, i32>,
        rate_limits: &HashMap<String, RateLimit>,
    ) -> Self {
        let mut providers: Vec<RegisteredProvider> = providers
            .into_iter()
            .enumerate()
            .map(|(index, provider)| {
                let id = provider.id();
                let descriptor = ProviderDescriptor {
                    name: Cow::Borrowed(id),
                    priority: priorities
                        .get(id)
                        .copied()
                        .unwrap_or_else(|| provider.priority() as i32),
                    capabilities: provider.capabilities().iter().copied().collect(),
                    rate_limit: rate_limits
                        .get(id)
                        .cloned()
                        .unwrap_or_else(|| provider.rate_limit()),
                    registration_index: index,
                };
                debug!(
                    "Registered provider '{}' (priority {}, {} capabilities)",
                    descriptor.name,
                    descriptor.priority,
                    descriptor.capabilities.len()
                );
                RegisteredProvider {
                    descriptor,
                    provider,
                }
            })
            .collect();

        providers.sort_by_key(|p| p.descriptor.priority);

        info!(
            "Provider registry ready: {}",
            providers
                .iter()
                .map(|p| p.descriptor.name.as_ref())
                .collect::<Vec<_>>()
                .join(" > ")
        );

        Self { providers }
    }

    /// Providers able to answer `capability`, in fallback order.
    pub fn eligible(&self, capability: Capability) -> Vec<&RegisteredProvider> {
        self.providers
            .iter()
            .filter(|p| p.descriptor.supports(capability))
            .collect()
    }

    /// All descriptors in priority order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter().map(|p| &p.descriptor)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
