//! Property-based integration tests for resolution ordering and admission.
//!
//! These tests verify that universal properties hold across randomly
//! generated provider sets and load, using the `proptest` crate.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;

use cbb_sports_data::{
    Capability, ConcurrencyGovernor, Operation, ProviderRegistry, RateLimiter, Resolver,
    ResolverSettings, SportsDataProvider,
};
use common::{CallLog, MockProvider};

const NAMES: [&str; 6] = ["espn", "ncaa", "sportsdataverse", "cbbpy", "kenpom", "barttorvik"];

// =============================================================================
// Generators
// =============================================================================

/// Priority, roster support and failure switch for one generated provider.
fn arb_provider() -> impl Strategy<Value = (u8, bool, bool)> {
    (0u8..5, any::<bool>(), any::<bool>())
}

fn arb_providers() -> impl Strategy<Value = Vec<(u8, bool, bool)>> {
    proptest::collection::vec(arb_provider(), 1..=NAMES.len())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Eligible providers are attempted by ascending priority (ties in
    /// registration order), stopping at the first success, and the winner
    /// is reported as the provenance.
    #[test]
    fn prop_attempts_follow_priority_order(setups in arb_providers()) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let providers: Vec<Arc<dyn SportsDataProvider>> = setups
            .iter()
            .enumerate()
            .map(|(i, (priority, roster, fail))| {
                let capabilities: &[Capability] = if *roster {
                    &[Capability::Roster]
                } else {
                    &[Capability::LiveScores]
                };
                let mut provider = MockProvider::new(NAMES[i], *priority, capabilities)
                    .with_log(log.clone());
                if *fail {
                    provider = provider.failing();
                }
                Arc::new(provider) as Arc<dyn SportsDataProvider>
            })
            .collect();

        // Expected: eligible providers sorted stably by priority, cut after
        // the first one that succeeds.
        let mut eligible: Vec<(usize, u8, bool)> = setups
            .iter()
            .enumerate()
            .filter(|(_, (_, roster, _))| *roster)
            .map(|(i, (priority, _, fail))| (i, *priority, *fail))
            .collect();
        eligible.sort_by_key(|(_, priority, _)| *priority);
        let mut expected = Vec::new();
        let mut winner = None;
        for (i, _, fail) in &eligible {
            expected.push(NAMES[*i]);
            if !fail {
                winner = Some(NAMES[*i]);
                break;
            }
        }

        let resolver = Resolver::new(
            Arc::new(ProviderRegistry::new(providers)),
            Arc::new(RateLimiter::new()),
            ResolverSettings::default(),
        );
        let operation = Operation::Roster { team_id: "150".to_string() };
        let result = runtime().block_on(resolver.resolve(&operation, Capability::Roster));

        prop_assert_eq!(log.lock().unwrap().clone(), expected.clone());
        match (result, winner) {
            (Ok(resolved), Some(name)) => prop_assert_eq!(resolved.provider.as_ref(), name),
            (Err(err), None) => {
                let tried: Vec<&str> = err.failures().iter().map(|f| f.provider.as_ref()).collect();
                prop_assert_eq!(tried, expected);
            }
            (result, winner) => {
                prop_assert!(false, "unexpected outcome {:?} (expected winner {:?})", result, winner);
            }
        }
    }

    /// The governor never has more admitted-but-unreleased callers than its
    /// limit, and every caller is eventually admitted.
    #[test]
    fn prop_governor_never_exceeds_limit(limit in 1usize..8, callers in 1usize..40) {
        let governor = ConcurrencyGovernor::new(limit);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let admitted = runtime().block_on(async {
            let handles: Vec<_> = (0..callers)
                .map(|n| {
                    let governor = governor.clone();
                    let active = active.clone();
                    let peak = peak.clone();
                    tokio::spawn(async move {
                        let permit = governor.admit(Duration::from_secs(3600)).await;
                        if permit.is_err() {
                            return false;
                        }
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10 + (n % 7) as u64)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        true
                    })
                })
                .collect();

            let mut admitted = 0;
            for handle in handles {
                if handle.await.unwrap() {
                    admitted += 1;
                }
            }
            admitted
        });

        prop_assert_eq!(admitted, callers);
        prop_assert!(peak.load(Ordering::SeqCst) <= limit);
        prop_assert_eq!(governor.in_flight(), 0);
    }
}
