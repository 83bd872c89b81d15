//! Sports data provider abstractions.
//!
//! This module contains:
//! - The `SportsDataProvider` trait that all upstream adapters implement
//! - Capability tags and rate limiting configuration
//!
//! Adapters own their HTTP and parsing logic (see [`crate::http`] for the
//! shared transport); the core only sees the capability contract.

mod capabilities;
mod traits;

pub use capabilities::{Capability, RateLimit};
pub use traits::SportsDataProvider;
