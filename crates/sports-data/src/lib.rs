//! College Basketball Sports Data Crate
//!
//! This crate resolves college basketball data requests (scores, teams,
//! rankings, stats, ...) against several upstream sources, transparently
//! falling back when one of them is down, slow or rate limited.
//!
//! # Overview
//!
//! - Priority-ordered fallback across providers, filtered by capability
//! - Two-layer TTL cache (memory + disk) with request coalescing
//! - Per-provider token-bucket rate limiting
//! - A global cap on concurrent calls
//! - A shared HTTP transport for adapters
//!
//! # Architecture
//!
//! ```text
//!                          +---------------------+
//!    Operation ----------> |  SportsDataContext  |  validate, admit
//!                          +---------------------+
//!                                    |
//!                                    v
//!                          +---------------------+
//!                          |    TieredCache      |  memory -> disk, single-flight
//!                          +---------------------+
//!                                    | miss
//!                                    v
//!                          +---------------------+
//!                          |      Resolver       |  fallback by priority
//!                          +---------------------+
//!                                    |
//!                                    v
//!                          +---------------------+
//!                          |    RateLimiter      |  token bucket per provider
//!                          +---------------------+
//!                                    |
//!                                    v
//!                          +---------------------+
//!                          | SportsDataProvider  |  ESPN, NCAA, ...
//!                          +---------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Operation`] - A typed logical request
//! - [`Capability`] - What a provider must support to answer an operation
//! - [`DataValue`] - The domain value a resolution produces
//! - [`SportsDataProvider`] - Trait implemented by upstream adapters
//! - [`SportsDataContext`] - The resolution boundary
//! - [`SportsDataError`] - The only error that crosses the boundary

pub mod cache;
pub mod config;
pub mod context;
pub mod errors;
pub mod governor;
pub mod http;
pub mod models;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod validation;

pub use models::{
    BoxScore, ConferenceStandings, DataValue, EntityId, Game, GameStatus, Operation, PlayByPlay,
    Player, PlayerStats, Poll, PollType, ProviderId, Season, StatLeader, Team, TeamStats,
};

pub use cache::{
    CacheEntry, CacheKey, CacheSettings, CacheStats, Clock, ManualClock, SystemClock,
    TieredCache, TtlClass, TtlPolicy,
};
pub use config::SportsDataConfig;
pub use context::{ResolvedValue, SportsDataContext, SportsDataContextBuilder};
pub use errors::{ErrorKind, FailureCause, ProviderError, SourceError, SportsDataError};
pub use governor::{AdmissionPermit, ConcurrencyGovernor};
pub use http::{HttpSettings, HttpTransport, TransportError};
pub use provider::{Capability, RateLimit, SportsDataProvider};
pub use registry::{ProviderDescriptor, ProviderRegistry, RateLimiter};
pub use resolver::{ResolutionResult, Resolver, ResolverSettings};
