//! Request coalescing: at most one fetch per key is in flight.

use std::future::Future;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::debug;
use tokio::task::JoinError;

use super::key::CacheKey;

type Flight<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

/// Removes the flight from the table when the fetch task ends, whether it
/// returned, panicked or was cancelled.
struct Landing<V, E> {
    flights: Arc<DashMap<CacheKey, Flight<V, E>>>,
    key: CacheKey,
}

impl<V, E> Drop for Landing<V, E> {
    fn drop(&mut self) {
        self.flights.remove(&self.key);
    }
}

/// Coalesces concurrent fetches for the same key.
///
/// The first caller for a key spawns the fetch on the runtime; callers that
/// arrive while it runs await the same shared outcome. Because the fetch is
/// its own task, a waiter that times out or is dropped does not cancel it
/// for the others.
pub(crate) struct SingleFlight<V, E> {
    flights: Arc<DashMap<CacheKey, Flight<V, E>>>,
}

impl<V, E> SingleFlight<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            flights: Arc::new(DashMap::new()),
        }
    }

    /// Run `fetch` for `key` unless a fetch for it is already in flight, and
    /// return the shared outcome. `on_abort` converts a fetch task that
    /// panicked or was cancelled into an error.
    pub async fn run<Fut, A>(&self, key: &CacheKey, fetch: Fut, on_abort: A) -> Result<V, E>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        A: FnOnce(JoinError) -> E + Send + 'static,
    {
        let flight = match self.flights.entry(key.clone()) {
            Entry::Occupied(existing) => {
                debug!("Joining in-flight fetch for {}", key);
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                let landing = Landing {
                    flights: Arc::clone(&self.flights),
                    key: key.clone(),
                };
                let handle = tokio::spawn(async move {
                    let _landing = landing;
                    fetch.await
                });
                let flight = async move {
                    match handle.await {
                        Ok(result) => result,
                        Err(e) => Err(on_abort(e)),
                    }
                }
                .boxed()
                .shared();
                slot.insert(flight.clone());
                flight
            }
        };

        flight.await
    }

    /// Number of keys with a fetch in flight.
    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }
}
