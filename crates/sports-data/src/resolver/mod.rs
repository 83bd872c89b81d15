//! Priority-ordered fallback across providers.
//!
//! ```text
//! eligible(capability) ──► [espn] ──fail──► [ncaa] ──fail──► [sportsdataverse]
//!                             │ ok             │ ok               │ ok / fail
//!                             ▼                ▼                  ▼
//!                      ResolutionResult  ResolutionResult   AllSourcesFailed
//! ```
//!
//! Each attempt acquires a rate-limit token, calls the provider under a
//! timeout and checks that the answer is well formed. The first good answer
//! wins; every failure is recorded in attempt order.

#[allow(clippy::module_inception)]
mod resolver;

pub use resolver::{ResolutionResult, Resolver, ResolverSettings};
