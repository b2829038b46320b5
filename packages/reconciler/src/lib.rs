#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Nearby-parking annotation reconciliation.
//!
//! Takes one directory fetch's worth of [`ParkingLotRecord`]s, geocodes
//! every record concurrently, and commits the resulting pin set to a
//! [`PinSink`] exactly once — when, and only when, every lookup has
//! resolved (successfully or not). Individual geocode misses and failures
//! shrink the pin set but never abort the batch.
//!
//! Each batch carries a generation id from a monotonic counter. A batch
//! that has been superseded by a newer one before finishing is discarded
//! at commit time; its in-flight lookups run to completion and their
//! results are dropped. No cancellation, no merging.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::stream::{self, StreamExt as _};
use sparking_geocoder::{Geocoder, address};
use sparking_models::{GeocodedPin, ParkingLotRecord};

/// Receives the committed pin set of a completed batch.
///
/// Implementations own the displayed pin set and must replace it
/// wholesale — commits are never merged with previous state.
pub trait PinSink: Send + Sync {
    /// Replaces the displayed parking pins with `pins`.
    fn commit_pins(&self, generation: u64, pins: Vec<GeocodedPin>);
}

/// What happened to one reconciliation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// The batch's generation id.
    pub generation: u64,
    /// Number of records submitted.
    pub total: usize,
    /// Number of lookups that resolved (success, miss, or failure).
    pub resolved: usize,
    /// Number of pins produced by successful lookups.
    pub pin_count: usize,
    /// Whether the pin set was committed to the sink. `false` means the
    /// batch was superseded and its result discarded.
    pub committed: bool,
}

/// Default number of geocode lookups in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Drives per-record geocoding for directory batches and commits each
/// completed batch's pin set to the sink.
pub struct Reconciler<G, S> {
    geocoder: Arc<G>,
    sink: Arc<S>,
    generation: AtomicU64,
    concurrency: usize,
}

impl<G, S> Reconciler<G, S>
where
    G: Geocoder,
    S: PinSink,
{
    /// Creates a reconciler with the default lookup concurrency.
    #[must_use]
    pub fn new(geocoder: Arc<G>, sink: Arc<S>) -> Self {
        Self {
            geocoder,
            sink,
            generation: AtomicU64::new(0),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets the number of lookups in flight at once.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// The generation id of the most recently started batch.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Geocodes `records` concurrently and commits the resulting pin set.
    ///
    /// Every record counts toward completion exactly once, whether its
    /// lookup succeeded, missed, or failed. An empty batch commits an
    /// empty pin set, which is distinct from "never queried" on the sink
    /// side. If a newer batch starts while this one is in flight, this
    /// batch's result is discarded instead of committed.
    pub async fn reconcile(&self, records: Vec<ParkingLotRecord>) -> BatchOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let total = records.len();
        log::info!("batch {generation}: geocoding {total} records");

        let lookups = records.into_iter().map(|record| {
            let geocoder = Arc::clone(&self.geocoder);
            async move {
                let query =
                    address::with_city_prefix(&address::strip_parenthetical(&record.address));
                let result = geocoder.forward(&query).await;
                (record, result)
            }
        });

        let mut completions = stream::iter(lookups).buffer_unordered(self.concurrency.max(1));

        // All completions drain on this task, so `resolved` and `pins`
        // have a single writer no matter how the lookups interleave.
        let mut resolved = 0_usize;
        let mut pins: Vec<GeocodedPin> = Vec::new();
        while let Some((record, result)) = completions.next().await {
            resolved += 1;
            match result {
                Ok(Some(coordinate)) => pins.push(GeocodedPin::for_lot(&record, coordinate)),
                Ok(None) => {
                    log::debug!("batch {generation}: no match for '{}'", record.name);
                }
                Err(e) => {
                    log::warn!("batch {generation}: geocode failed for '{}': {e}", record.name);
                }
            }
        }
        drop(completions);
        debug_assert_eq!(resolved, total);

        let pin_count = pins.len();
        let committed = self.generation.load(Ordering::SeqCst) == generation;
        if committed {
            self.sink.commit_pins(generation, pins);
            log::info!("batch {generation}: committed {pin_count}/{total} pins");
        } else {
            log::info!("batch {generation}: superseded, discarding {pin_count} pins");
        }

        BatchOutcome {
            generation,
            total,
            resolved,
            pin_count,
            committed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use sparking_geocoder::GeocodeError;
    use sparking_models::Coordinate;
    use tokio::sync::Semaphore;

    /// Scripted geocoder keyed by the normalized query address. Addresses
    /// in `gated` block on the semaphore before resolving and signal
    /// `entered` when the lookup has started.
    #[derive(Default)]
    struct FakeGeocoder {
        hits: HashMap<String, Coordinate>,
        failures: HashSet<String>,
        gated: HashSet<String>,
        gate: Option<Arc<Semaphore>>,
        entered: Option<Arc<Semaphore>>,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn forward(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
            if self.gated.contains(query) {
                if let Some(entered) = &self.entered {
                    entered.add_permits(1);
                }
                if let Some(gate) = &self.gate {
                    gate.acquire().await.expect("gate closed").forget();
                }
            }
            if self.failures.contains(query) {
                return Err(GeocodeError::Parse {
                    message: "scripted failure".to_string(),
                });
            }
            Ok(self.hits.get(query).copied())
        }

        async fn reverse(&self, _: Coordinate) -> Result<Option<String>, GeocodeError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        commits: Mutex<Vec<(u64, Vec<GeocodedPin>)>>,
    }

    impl CollectingSink {
        fn commits(&self) -> Vec<(u64, Vec<GeocodedPin>)> {
            self.commits.lock().unwrap().clone()
        }
    }

    impl PinSink for CollectingSink {
        fn commit_pins(&self, generation: u64, pins: Vec<GeocodedPin>) {
            self.commits.lock().unwrap().push((generation, pins));
        }
    }

    fn record(name: &str, address: &str) -> ParkingLotRecord {
        ParkingLotRecord {
            name: name.to_string(),
            address: address.to_string(),
            fee_display: "유료".to_string(),
            base_charge: 430.0,
            capacity: 100,
            occupied: 10,
        }
    }

    /// The query the reconciler submits for a raw directory address.
    fn query_for(raw: &str) -> String {
        address::with_city_prefix(&address::strip_parenthetical(raw))
    }

    #[tokio::test]
    async fn commits_all_resolved_pins_once() {
        let mut geocoder = FakeGeocoder::default();
        geocoder
            .hits
            .insert(query_for("중구 을지로 227"), Coordinate::new(37.566, 126.991));
        geocoder.hits.insert(
            query_for("종로구 세종로 80-1(세종문화회관 옆)"),
            Coordinate::new(37.572, 126.976),
        );

        let sink = Arc::new(CollectingSink::default());
        let reconciler = Reconciler::new(Arc::new(geocoder), Arc::clone(&sink));

        let outcome = reconciler
            .reconcile(vec![
                record("훈련원공원", "중구 을지로 227"),
                record("세종로", "종로구 세종로 80-1(세종문화회관 옆)"),
            ])
            .await;

        assert_eq!(outcome.generation, 1);
        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.resolved, 2);
        assert_eq!(outcome.pin_count, 2);
        assert!(outcome.committed);

        let commits = sink.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].0, 1);
        assert_eq!(commits[0].1.len(), 2);
    }

    #[tokio::test]
    async fn misses_and_failures_count_toward_completion() {
        let mut geocoder = FakeGeocoder::default();
        geocoder
            .hits
            .insert(query_for("중구 을지로 227"), Coordinate::new(37.566, 126.991));
        geocoder.failures.insert(query_for("강남구 테헤란로 1"));
        // "서초구 없는길 9" resolves to a miss: not in hits, not a failure.

        let sink = Arc::new(CollectingSink::default());
        let reconciler = Reconciler::new(Arc::new(geocoder), Arc::clone(&sink));

        let outcome = reconciler
            .reconcile(vec![
                record("을지로", "중구 을지로 227"),
                record("테헤란로", "강남구 테헤란로 1"),
                record("없는길", "서초구 없는길 9"),
            ])
            .await;

        assert_eq!(outcome.resolved, 3);
        assert_eq!(outcome.pin_count, 1);
        assert!(outcome.committed);

        let commits = sink.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].1[0].title, "을지로");
    }

    #[tokio::test]
    async fn all_failing_batch_commits_empty_set_exactly_once() {
        let mut geocoder = FakeGeocoder::default();
        geocoder.failures.insert(query_for("중구 을지로 227"));
        geocoder.failures.insert(query_for("강남구 테헤란로 1"));

        let sink = Arc::new(CollectingSink::default());
        let reconciler = Reconciler::new(Arc::new(geocoder), Arc::clone(&sink));

        let outcome = reconciler
            .reconcile(vec![
                record("을지로", "중구 을지로 227"),
                record("테헤란로", "강남구 테헤란로 1"),
            ])
            .await;

        assert_eq!(outcome.resolved, 2);
        assert_eq!(outcome.pin_count, 0);
        assert!(outcome.committed);

        let commits = sink.commits();
        assert_eq!(commits.len(), 1);
        assert!(commits[0].1.is_empty());
    }

    #[tokio::test]
    async fn empty_batch_commits_empty_set() {
        let sink = Arc::new(CollectingSink::default());
        let reconciler = Reconciler::new(Arc::new(FakeGeocoder::default()), Arc::clone(&sink));

        let outcome = reconciler.reconcile(Vec::new()).await;

        assert_eq!(outcome.total, 0);
        assert!(outcome.committed);
        assert_eq!(sink.commits().len(), 1);
        assert!(sink.commits()[0].1.is_empty());
    }

    #[tokio::test]
    async fn superseded_batch_is_discarded_not_committed() {
        let gate = Arc::new(Semaphore::new(0));
        let entered = Arc::new(Semaphore::new(0));

        let mut geocoder = FakeGeocoder::default();
        geocoder
            .hits
            .insert(query_for("중구 을지로 227"), Coordinate::new(37.566, 126.991));
        geocoder
            .hits
            .insert(query_for("강남구 테헤란로 1"), Coordinate::new(37.508, 127.036));
        geocoder.gated.insert(query_for("중구 을지로 227"));
        geocoder.gate = Some(Arc::clone(&gate));
        geocoder.entered = Some(Arc::clone(&entered));

        let sink = Arc::new(CollectingSink::default());
        let reconciler = Arc::new(Reconciler::new(Arc::new(geocoder), Arc::clone(&sink)));

        let slow = Arc::clone(&reconciler);
        let first = tokio::spawn(async move {
            slow.reconcile(vec![record("을지로", "중구 을지로 227")]).await
        });

        // Wait until the first batch's lookup is in flight, then start a
        // second batch before the first can finish.
        entered.acquire().await.unwrap().forget();
        let second = reconciler
            .reconcile(vec![record("테헤란로", "강남구 테헤란로 1")])
            .await;
        assert_eq!(second.generation, 2);
        assert!(second.committed);

        gate.add_permits(1);
        let outcome = first.await.unwrap();
        assert_eq!(outcome.generation, 1);
        assert_eq!(outcome.resolved, 1);
        assert!(!outcome.committed);

        // Only the newer batch ever reached the sink.
        let commits = sink.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].0, 2);
        assert_eq!(commits[0].1[0].title, "테헤란로");
    }

    #[tokio::test]
    async fn sequential_batches_get_increasing_generations() {
        let mut geocoder = FakeGeocoder::default();
        geocoder
            .hits
            .insert(query_for("중구 을지로 227"), Coordinate::new(37.566, 126.991));

        let sink = Arc::new(CollectingSink::default());
        let reconciler = Reconciler::new(Arc::new(geocoder), Arc::clone(&sink));

        let first = reconciler.reconcile(vec![record("을지로", "중구 을지로 227")]).await;
        let second = reconciler.reconcile(vec![record("을지로", "중구 을지로 227")]).await;

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert!(first.committed && second.committed);
        assert_eq!(sink.commits().len(), 2);
        assert_eq!(reconciler.current_generation(), 2);
    }
}
