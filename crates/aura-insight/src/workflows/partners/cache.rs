use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::directory::{normalize_directory, DirectorySource};
use super::domain::AgencyRecord;

/// Time source so expiry can be driven from tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CachedDirectory {
    agencies: Arc<Vec<AgencyRecord>>,
    fetched_at: DateTime<Utc>,
}

/// Holds the last normalized directory and refreshes it wholesale once the TTL
/// lapses. The fetch runs under the lock, so callers inside one window share a
/// single fetch and observe the same set.
pub struct DirectoryCache {
    source: Box<dyn DirectorySource>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    state: Mutex<Option<CachedDirectory>>,
}

impl DirectoryCache {
    pub fn new(source: Box<dyn DirectorySource>, ttl: Duration) -> Self {
        Self::with_clock(source, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(source: Box<dyn DirectorySource>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365));
        Self {
            source,
            clock,
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Current directory. Fetch failures yield an empty set and are cached
    /// until the window closes.
    ///
    /// A refresh calls the source synchronously, and `HttpDirectorySource`
    /// blocks on its runtime, so callers inside async code must go through
    /// `tokio::task::spawn_blocking`. Calling this on a runtime worker thread
    /// panics when a refresh is due.
    pub fn agencies(&self) -> Arc<Vec<AgencyRecord>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();

        if let Some(cached) = state.as_ref() {
            if now.signed_duration_since(cached.fetched_at) < self.ttl {
                debug!(count = cached.agencies.len(), "partner directory served from cache");
                return Arc::clone(&cached.agencies);
            }
        }

        let agencies = match self.source.fetch() {
            Ok(entries) => {
                let records = normalize_directory(&entries);
                info!(count = records.len(), "partner directory refreshed");
                records
            }
            Err(err) => {
                warn!(error = %err, source = ?self.source, "partner directory unavailable");
                Vec::new()
            }
        };

        let agencies = Arc::new(agencies);
        *state = Some(CachedDirectory {
            agencies: Arc::clone(&agencies),
            fetched_at: now,
        });
        agencies
    }

    /// Forces the next call to refetch.
    pub fn invalidate(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = None;
    }
}

impl std::fmt::Debug for DirectoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryCache")
            .field("source", &self.source)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::partners::directory::DirectoryError;
    use crate::workflows::partners::domain::RawAgency;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingSource {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl DirectorySource for CountingSource {
        fn fetch(&self) -> Result<Vec<RawAgency>, DirectoryError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DirectoryError::Status(503));
            }
            Ok(vec![
                RawAgency::named(format!("Agency {call}")),
                RawAgency::named("Stable Partner").with_weight(4),
            ])
        }
    }

    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn starting_at(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        fn advance(&self, by: chrono::Duration) {
            let mut guard = self.now.lock().expect("clock mutex poisoned");
            *guard += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().expect("clock mutex poisoned")
        }
    }

    fn fixture(fail: bool) -> (DirectoryCache, Arc<AtomicUsize>, Arc<ManualClock>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let clock = Arc::new(ManualClock::starting_at(
            "2025-03-01T09:00:00Z".parse().expect("valid timestamp"),
        ));
        let source = CountingSource {
            calls: Arc::clone(&calls),
            fail,
        };
        let cache = DirectoryCache::with_clock(
            Box::new(source),
            Duration::from_secs(600),
            clock.clone(),
        );
        (cache, calls, clock)
    }

    #[test]
    fn serves_same_set_within_ttl() {
        let (cache, calls, clock) = fixture(false);

        let first = cache.agencies();
        clock.advance(chrono::Duration::seconds(599));
        let second = cache.agencies();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn refreshes_after_expiry() {
        let (cache, calls, clock) = fixture(false);

        let first = cache.agencies();
        clock.advance(chrono::Duration::seconds(600));
        let second = cache.agencies();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(first[0].name, "Agency 0");
        assert_eq!(second[0].name, "Agency 1");
    }

    #[test]
    fn failed_fetch_yields_cached_empty_set() {
        let (cache, calls, clock) = fixture(true);

        assert!(cache.agencies().is_empty());
        assert!(cache.agencies().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(chrono::Duration::minutes(11));
        assert!(cache.agencies().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_callers_share_one_fetch() {
        let (cache, calls, _clock) = fixture(false);
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.agencies())
            })
            .collect();

        let sets: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sets.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[test]
    fn invalidate_forces_refetch() {
        let (cache, calls, _clock) = fixture(false);

        cache.agencies();
        cache.invalidate();
        cache.agencies();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
