//! Cache Store Module
//!
//! Main cache engine combining the recency index with size accounting, TTL
//! expiry and a background reclaimer.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::{CacheSize, CacheStats, Clock, Entry, Lookup, RecencyIndex, SystemClock};
use crate::config::{CacheConfig, DEFAULT_TTL};
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_reclaimer, ReclaimerHandle};

/// Everything guarded by the cache lock.
#[derive(Debug)]
pub(crate) struct CacheState<V> {
    pub(crate) index: RecencyIndex<V>,
    /// Sum of `Entry::size` over every entry in `index`
    pub(crate) cur_size: usize,
    pub(crate) stats: CacheStats,
}

impl<V> Default for CacheState<V> {
    fn default() -> Self {
        Self {
            index: RecencyIndex::new(),
            cur_size: 0,
            stats: CacheStats::new(),
        }
    }
}

impl<V: Clone> CacheState<V> {
    /// Reads a key, promoting and refreshing it on a hit.
    fn lookup(&mut self, key: &str, now: i64) -> Lookup<V> {
        let lookup = match self.index.get(key) {
            None => Lookup::Missing,
            Some(entry) if entry.is_expired(now) => Lookup::Expired,
            Some(entry) => Lookup::Hit(entry.value.clone()),
        };

        if lookup.is_hit() {
            self.index.move_to_back(key);
            if let Some(entry) = self.index.get_mut(key) {
                entry.touch(now);
            }
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        lookup
    }
}

impl<V> CacheState<V> {
    fn remove(&mut self, key: &str) -> Option<Entry<V>> {
        let entry = self.index.remove(key)?;
        self.cur_size -= entry.size();
        Some(entry)
    }
}

/// State shared between the cache handle and its reclaimer task.
#[derive(Debug)]
pub(crate) struct Shared<V> {
    pub(crate) config: CacheConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) state: Mutex<CacheState<V>>,
    /// Single-slot shrink request queue
    shrink_tx: mpsc::Sender<()>,
}

/// Summary of one reclamation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reclaimed {
    pub entries: usize,
    pub size: usize,
}

impl<V> Shared<V> {
    // == Shrink ==
    /// Evicts least recently used entries until the size is at or below
    /// the low watermark.
    ///
    /// Eviction follows recency only; TTL is not consulted. The lock is
    /// re-acquired for every removal.
    pub(crate) async fn shrink(&self) -> Reclaimed {
        let mut reclaimed = Reclaimed::default();
        loop {
            let mut state = self.state.lock().await;
            if state.cur_size <= self.config.low {
                break;
            }
            let Some(entry) = state.index.pop_front() else {
                break;
            };
            state.cur_size -= entry.size();
            state.stats.record_eviction();
            reclaimed.entries += 1;
            reclaimed.size += entry.size();
        }
        reclaimed
    }

    // == Sweep ==
    /// Removes every logically expired entry.
    ///
    /// Keys are snapshotted first, then each one is re-checked and removed
    /// under its own lock acquisition.
    pub(crate) async fn sweep_expired(&self) -> Reclaimed {
        let keys = self.state.lock().await.index.keys();

        let mut reclaimed = Reclaimed::default();
        for key in keys {
            let mut state = self.state.lock().await;
            let now = self.clock.now();
            if !state.index.get(&key).is_some_and(|e| e.is_expired(now)) {
                continue;
            }
            if let Some(entry) = state.remove(&key) {
                state.stats.record_expiration();
                reclaimed.entries += 1;
                reclaimed.size += entry.size();
            }
        }
        reclaimed
    }
}

// == Cache ==
/// A size-bounded, time-expiring key/value cache.
///
/// All operations serialize on one lock around the recency index. Construction
/// spawns a reclaimer task on the current tokio runtime which shrinks the
/// cache when a put reaches the high watermark and periodically sweeps out
/// expired entries. The task stops on [`Cache::destroy`] or when the cache is
/// dropped.
#[derive(Debug)]
pub struct Cache<V> {
    shared: Arc<Shared<V>>,
    reclaimer: Mutex<Option<ReclaimerHandle>>,
}

impl<V> Cache<V>
where
    V: CacheSize + Clone + Send + 'static,
{
    // == Constructors ==
    /// Creates a cache with default watermarks and interval.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::from_config(CacheConfig::new(name))
    }

    /// Creates a cache from a flat JSON document.
    ///
    /// Malformed documents are ignored and defaults are used.
    pub fn with_config(name: impl Into<String>, raw: &str) -> Result<Self> {
        Self::from_config(CacheConfig::from_json(name, raw))
    }

    pub fn from_config(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache that reads time from `clock`.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// `InvalidConfig` when the watermarks are inverted; no task is spawned
    /// in that case.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|err| {
            CacheError::Internal(format!("cache requires a tokio runtime: {err}"))
        })?;

        let (shrink_tx, shrink_rx) = mpsc::channel(1);
        let shared = Arc::new(Shared {
            config,
            clock,
            state: Mutex::new(CacheState::default()),
            shrink_tx,
        });
        let reclaimer = spawn_reclaimer(&runtime, Arc::clone(&shared), shrink_rx);

        info!(
            cache = %shared.config.name,
            low = shared.config.low,
            high = shared.config.high,
            interval_secs = shared.config.interval.as_secs(),
            "cache created"
        );

        Ok(Self {
            shared,
            reclaimer: Mutex::new(Some(reclaimer)),
        })
    }

    // == Get ==
    /// Returns the value for `key` if present and not logically expired.
    ///
    /// Expired entries are left in place for the sweep.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.get_ex(key).await.into_option()
    }

    /// Like [`Cache::get`], reporting why a miss happened.
    pub async fn get_ex(&self, key: &str) -> Lookup<V> {
        let mut state = self.shared.state.lock().await;
        state.lookup(key, self.shared.clock.now())
    }

    /// Reads several keys under one lock acquisition.
    ///
    /// The result has one slot per input key, in input order.
    pub async fn get_many<K: AsRef<str>>(&self, keys: &[K]) -> Vec<Option<V>> {
        let mut state = self.shared.state.lock().await;
        let now = self.shared.clock.now();
        keys.iter()
            .map(|key| state.lookup(key.as_ref(), now).into_option())
            .collect()
    }

    // == Put ==
    /// Stores a value, replacing any existing entry under `key`.
    ///
    /// A `None` TTL means the default of one year. When the aggregate size
    /// reaches the high watermark a shrink is requested without waiting.
    pub async fn put(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(DEFAULT_TTL);

        let needs_shrink = {
            let mut guard = self.shared.state.lock().await;
            let state = &mut *guard;
            let now = self.shared.clock.now();

            match state.index.get_mut(&key) {
                Some(entry) => {
                    let old_size = entry.update(value, ttl, now);
                    state.cur_size = state.cur_size - old_size + entry.size();
                    state.index.move_to_back(&key);
                }
                None => {
                    let entry = Entry::new(key, value, ttl, now);
                    state.cur_size += entry.size();
                    state.index.push_back(entry);
                }
            }
            state.cur_size >= self.shared.config.high
        };

        if needs_shrink {
            self.request_shrink();
        }
    }

    fn request_shrink(&self) {
        match self.shared.shrink_tx.try_send(()) {
            Ok(()) => debug!(cache = %self.shared.config.name, "shrink requested"),
            // A request is already pending
            Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => {
                debug!(cache = %self.shared.config.name, "reclaimer stopped, shrink skipped")
            }
        }
    }

    // == Delete ==
    /// Removes an entry.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        state
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    /// Gives a still-valid entry a new TTL counted from now.
    ///
    /// An entry that is already logically expired is left untouched and the
    /// call still succeeds.
    pub async fn delay_delete(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        let now = self.shared.clock.now();
        let entry = state
            .index
            .get_mut(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

        if !entry.is_expired(now) {
            entry.ttl = ttl;
            entry.touch(now);
        }
        Ok(())
    }

    /// True if `key` is present and not logically expired. Does not promote.
    pub async fn exists(&self, key: &str) -> bool {
        let state = self.shared.state.lock().await;
        let now = self.shared.clock.now();
        state.index.get(key).is_some_and(|e| !e.is_expired(now))
    }

    // == Clear ==
    /// Discards every entry.
    pub async fn clear_all(&self) {
        let mut state = self.shared.state.lock().await;
        state.index.clear();
        state.cur_size = 0;
    }

    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Keys are snapshotted under the lock, then removed one lock acquisition
    /// at a time. Matching keys inserted while the scan runs may or may not
    /// be removed. Returns the number of entries removed.
    pub async fn clear_prefix(&self, prefix: &str) -> usize {
        let keys = self.shared.state.lock().await.index.keys();

        let mut removed = 0;
        for key in keys.iter().filter(|k| k.starts_with(prefix)) {
            let mut state = self.shared.state.lock().await;
            if state.remove(key).is_some() {
                removed += 1;
            }
        }

        debug!(cache = %self.shared.config.name, prefix, removed, "cleared keys by prefix");
        removed
    }

    // == Introspection ==
    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    pub fn config(&self) -> &CacheConfig {
        &self.shared.config
    }

    /// Number of entries held, including logically expired ones.
    pub async fn len(&self) -> usize {
        self.shared.state.lock().await.index.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.shared.state.lock().await.index.is_empty()
    }

    pub async fn current_size(&self) -> usize {
        self.shared.state.lock().await.cur_size
    }

    /// Effective TTL of an entry, whether or not it has expired.
    pub async fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.shared.state.lock().await.index.get(key).map(|e| e.ttl)
    }

    /// Keys ordered from least to most recently used.
    pub async fn keys_by_recency(&self) -> Vec<String> {
        let state = self.shared.state.lock().await;
        state.index.iter().map(|e| e.key.clone()).collect()
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.shared.state.lock().await;
        let mut stats = state.stats.clone();
        stats.total_entries = state.index.len();
        stats.current_size = state.cur_size;
        stats
    }

    // == Lifecycle ==
    /// Stops the reclaimer and waits for it to exit.
    ///
    /// Only the first call does anything; later calls return immediately.
    /// Data operations keep working afterwards but nothing is reclaimed.
    pub async fn destroy(&self) {
        let mut reclaimer = self.reclaimer.lock().await;
        if let Some(handle) = reclaimer.take() {
            handle.stop().await;
            info!(cache = %self.shared.config.name, "cache destroyed");
        }
    }

    /// True until [`Cache::destroy`] has completed.
    pub async fn is_running(&self) -> bool {
        self.reclaimer
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    #[cfg(test)]
    pub(crate) fn shared(&self) -> &Arc<Shared<V>> {
        &self.shared
    }
}
