//! Global cap on concurrent resolution calls.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::errors::SportsDataError;

/// Admits at most `limit` calls at once. Waiters are admitted in arrival
/// order.
#[derive(Clone, Debug)]
pub struct ConcurrencyGovernor {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

/// Slot held by an admitted call. Released when dropped.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionPermit {
    /// Give the slot back. Equivalent to dropping the permit.
    pub fn release(self) {}
}

impl ConcurrencyGovernor {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Wait up to `timeout` for a slot.
    pub async fn admit(&self, timeout: Duration) -> Result<AdmissionPermit, SportsDataError> {
        let semaphore = Arc::clone(&self.semaphore);
        match tokio::time::timeout(timeout, semaphore.acquire_owned()).await {
            Ok(Ok(permit)) => {
                debug!("Admitted call ({} in flight)", self.in_flight());
                Ok(AdmissionPermit { _permit: permit })
            }
            // The semaphore is never closed; treat it like a timeout anyway.
            Ok(Err(_)) | Err(_) => {
                warn!(
                    "Admission timed out after {:?} ({} calls in flight)",
                    timeout,
                    self.in_flight()
                );
                Err(SportsDataError::AdmissionTimeout { waited: timeout })
            }
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn in_flight(&self) -> usize {
        self.limit - self.available()
    }
}
