//! Provider registry module.
//!
//! This module provides the static side of provider orchestration:
//! - Provider registration and priority ordering
//! - Capability filtering
//! - Rate limiting per provider

mod rate_limiter;
#[allow(clippy::module_inception)]
mod registry;

pub use rate_limiter::RateLimiter;
pub use registry::{ProviderDescriptor, ProviderRegistry, RegisteredProvider};
