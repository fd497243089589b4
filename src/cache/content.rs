// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Content cache with change detection and debounced refetching

use super::config::{CacheConfig, CacheScope};
use super::data_source::{DataSource, DataSourceId};
use super::dispatcher::{DataSourceDispatcher, is_error_marker};
use super::error::{CacheError, CacheResult};
use crate::ledger::PageId;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Key of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Data source the entry holds content for
    pub data_source_id: DataSourceId,
    /// Page the entry belongs to, with [`CacheScope::PerPage`]
    pub page_id: Option<PageId>,
}

impl CacheKey {
    /// Key of `data_source` under `scope`
    pub fn new(data_source: &DataSource, scope: CacheScope) -> Self {
        Self {
            data_source_id: data_source.id,
            page_id: match scope {
                CacheScope::PerDataSource => None,
                CacheScope::PerPage => Some(data_source.page_id),
            },
        }
    }
}

/// What a fetch was made with: data source configuration plus request payload
///
/// Two lookups with equal fingerprints would produce the same request.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    /// Data source as configured when fetched
    pub data_source: DataSource,
    /// Backend context sent with the request
    pub payload: Value,
}

impl Fingerprint {
    /// Create a fingerprint
    pub fn new(data_source: DataSource, payload: Value) -> Self {
        Self {
            data_source,
            payload,
        }
    }
}

/// Observable state of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Never fetched
    Empty,
    /// A debounced refetch is scheduled
    Pending,
    /// A request is in flight
    Fetching,
    /// Holds the result of the last completed request
    Settled,
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups whose fingerprint matched the latest request
    pub hits: u64,
    /// Fetches started without debouncing
    pub immediate_fetches: u64,
    /// Refetches scheduled after a changed lookup
    pub scheduled_fetches: u64,
    /// Scheduled refetches replaced by a newer change
    pub superseded: u64,
    /// Single data source requests sent
    pub dispatches: u64,
    /// Whole-page requests sent
    pub batch_dispatches: u64,
    /// Requests that failed
    pub failures: u64,
    /// Fetches skipped because the data source was not valid
    pub skipped_invalid: u64,
    /// Results dropped because their entry was cleared meanwhile
    pub discarded_results: u64,
}

#[derive(Debug)]
struct CacheEntry {
    page_id: PageId,
    // Entries re-created after a clear get a new epoch; results of older fetches are dropped.
    epoch: u64,
    value: Option<Value>,
    fingerprint: Option<Fingerprint>,
    requested: Option<Fingerprint>,
    in_flight: usize,
    pending: bool,
    timer_generation: u64,
}

impl CacheEntry {
    fn new(page_id: PageId, epoch: u64) -> Self {
        Self {
            page_id,
            epoch,
            value: None,
            fingerprint: None,
            requested: None,
            in_flight: 0,
            pending: false,
            timer_generation: 0,
        }
    }

    fn latest_fingerprint(&self) -> Option<&Fingerprint> {
        self.requested.as_ref().or(self.fingerprint.as_ref())
    }

    fn state(&self) -> EntryState {
        if self.pending {
            EntryState::Pending
        } else if self.in_flight > 0 {
            EntryState::Fetching
        } else if self.fingerprint.is_some() {
            EntryState::Settled
        } else {
            EntryState::Empty
        }
    }
}

#[derive(Default)]
struct CacheState {
    entries: FxHashMap<CacheKey, CacheEntry>,
    timers: FxHashMap<CacheKey, JoinHandle<()>>,
    stats: CacheStats,
    next_id: u64,
}

impl CacheState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Mark a fetch as started, cancelling any scheduled refetch; returns the entry epoch
    fn begin_fetch(&mut self, key: CacheKey, page_id: PageId, fingerprint: Fingerprint) -> u64 {
        if let Some(timer) = self.timers.remove(&key) {
            timer.abort();
        }
        let fresh = self.next_id();
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| CacheEntry::new(page_id, fresh));
        entry.pending = false;
        entry.requested = Some(fingerprint);
        entry.in_flight += 1;
        entry.epoch
    }
}

struct CacheInner {
    dispatcher: Arc<dyn DataSourceDispatcher>,
    config: CacheConfig,
    // Never held across an await point.
    state: Mutex<CacheState>,
}

impl CacheInner {
    async fn run_fetch(&self, key: CacheKey, epoch: u64, fingerprint: Fingerprint) -> Option<Value> {
        let data_source = &fingerprint.data_source;
        let value = if !self.dispatcher.is_valid(data_source) {
            log::debug!(
                "Data source '{}' is not configured, skipping fetch",
                data_source.name
            );
            self.state.lock().stats.skipped_invalid += 1;
            None
        } else {
            log::debug!("Fetching data source '{}'", data_source.name);
            self.state.lock().stats.dispatches += 1;
            match self.dispatcher.dispatch(data_source, &fingerprint.payload).await {
                Ok(value) => Some(value),
                Err(err) => {
                    log::warn!("Fetching data source '{}' failed: {err}", data_source.name);
                    self.state.lock().stats.failures += 1;
                    None
                }
            }
        };

        self.settle(key, epoch, fingerprint, value.clone());
        value
    }

    fn settle(&self, key: CacheKey, epoch: u64, fingerprint: Fingerprint, value: Option<Value>) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(entry) = state.entries.get_mut(&key).filter(|e| e.epoch == epoch) else {
            log::debug!(
                "Dropping result for data source {}, entry was cleared",
                key.data_source_id
            );
            state.stats.discarded_results += 1;
            return;
        };

        entry.in_flight = entry.in_flight.saturating_sub(1);
        if entry.requested.as_ref() == Some(&fingerprint) {
            entry.requested = None;
        }
        entry.value = value;
        entry.fingerprint = Some(fingerprint);
    }

    /// Start the scheduled refetch if it is still the current one
    fn fire_timer(&self, key: CacheKey, epoch: u64, generation: u64) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(entry) = state.entries.get_mut(&key) else {
            return false;
        };
        if entry.epoch != epoch || !entry.pending || entry.timer_generation != generation {
            return false;
        }

        state.timers.remove(&key);
        entry.pending = false;
        entry.in_flight += 1;
        true
    }
}

/// Cache of data source content
///
/// Cloning is cheap and clones share the same entries.
#[derive(Clone)]
pub struct ContentCache {
    inner: Arc<CacheInner>,
}

impl ContentCache {
    /// Create a cache with the default configuration
    pub fn new(dispatcher: Arc<dyn DataSourceDispatcher>) -> Self {
        Self::with_config(dispatcher, CacheConfig::default())
    }

    /// Create a cache with a custom configuration
    pub fn with_config(dispatcher: Arc<dyn DataSourceDispatcher>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                dispatcher,
                config,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Key under which `data_source` is cached
    pub fn key(&self, data_source: &DataSource) -> CacheKey {
        CacheKey::new(data_source, self.inner.config.scope)
    }

    /// Content of the last completed fetch
    pub fn value(&self, data_source: &DataSource) -> Option<Value> {
        let key = self.key(data_source);
        self.inner
            .state
            .lock()
            .entries
            .get(&key)
            .and_then(|entry| entry.value.clone())
    }

    /// State of the entry for `data_source`
    pub fn state(&self, data_source: &DataSource) -> EntryState {
        let key = self.key(data_source);
        self.inner
            .state
            .lock()
            .entries
            .get(&key)
            .map_or(EntryState::Empty, CacheEntry::state)
    }

    /// Fingerprint of the last completed fetch
    pub fn fingerprint(&self, data_source: &DataSource) -> Option<Fingerprint> {
        let key = self.key(data_source);
        self.inner
            .state
            .lock()
            .entries
            .get(&key)
            .and_then(|entry| entry.fingerprint.clone())
    }

    /// Snapshot of the cache counters
    pub fn stats(&self) -> CacheStats {
        self.inner.state.lock().stats
    }

    /// Make sure the content of `data_source` matches `payload`, without waiting
    ///
    /// An entry that was never fetched is fetched right away. Afterwards a
    /// lookup whose fingerprint equals the latest request is a no-op, and a
    /// changed one schedules a refetch once the debounce period passed with
    /// no further change. Returning to the fingerprint of the current content
    /// before that period ends cancels the scheduled refetch. Requests already
    /// in flight are never cancelled.
    ///
    /// Must be called from within a tokio runtime; otherwise nothing is fetched.
    pub fn smart_fetch(&self, data_source: &DataSource, payload: Value) {
        let Ok(runtime) = Handle::try_current() else {
            log::warn!(
                "No async runtime available to fetch data source '{}'",
                data_source.name
            );
            return;
        };

        let key = self.key(data_source);
        let fingerprint = Fingerprint::new(data_source.clone(), payload);
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;

        if !state.entries.contains_key(&key) {
            let epoch = state.begin_fetch(key, data_source.page_id, fingerprint.clone());
            state.stats.immediate_fetches += 1;
            let inner = Arc::clone(&self.inner);
            runtime.spawn(async move {
                inner.run_fetch(key, epoch, fingerprint).await;
            });
            return;
        }
        let Some(entry) = state.entries.get_mut(&key) else {
            return;
        };

        // Back to the settled query before the refetch started
        if entry.pending && entry.in_flight == 0 && entry.fingerprint.as_ref() == Some(&fingerprint) {
            entry.pending = false;
            entry.requested = None;
            if let Some(timer) = state.timers.remove(&key) {
                timer.abort();
            }
            state.stats.hits += 1;
            log::debug!(
                "Cancelled refetch of data source '{}', query matches its content",
                data_source.name
            );
            return;
        }

        if entry.latest_fingerprint() == Some(&fingerprint) {
            state.stats.hits += 1;
            return;
        }

        state.next_id += 1;
        let generation = state.next_id;
        let epoch = entry.epoch;
        entry.requested = Some(fingerprint.clone());
        entry.pending = true;
        entry.timer_generation = generation;
        state.stats.scheduled_fetches += 1;
        log::debug!(
            "Scheduling refetch of data source '{}' in {:?}",
            data_source.name,
            self.inner.config.debounce
        );

        let delay = self.inner.config.debounce;
        let inner = Arc::clone(&self.inner);
        let timer = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.fire_timer(key, epoch, generation) {
                inner.run_fetch(key, epoch, fingerprint).await;
            }
        });
        if let Some(previous) = state.timers.insert(key, timer) {
            previous.abort();
            state.stats.superseded += 1;
        }
    }

    /// Fetch `data_source` now and wait for the result
    ///
    /// A scheduled refetch of the same entry is cancelled. Failures are
    /// logged and settle the entry to no content.
    pub async fn fetch(&self, data_source: &DataSource, payload: Value) -> Option<Value> {
        let key = self.key(data_source);
        let fingerprint = Fingerprint::new(data_source.clone(), payload);
        let epoch = {
            let mut state = self.inner.state.lock();
            state.stats.immediate_fetches += 1;
            state.begin_fetch(key, data_source.page_id, fingerprint.clone())
        };
        self.inner.run_fetch(key, epoch, fingerprint).await
    }

    /// Fetch every data source of a page with a single request
    ///
    /// Data sources missing from the response, or answered with an error
    /// marker, settle to no content. When the request itself fails every
    /// entry of the page is cleared.
    pub async fn fetch_page(
        &self,
        page_id: PageId,
        data_sources: &[DataSource],
        payload: Value,
    ) -> CacheResult<()> {
        let tickets: Vec<_> = {
            let mut state = self.inner.state.lock();
            state.stats.batch_dispatches += 1;
            data_sources
                .iter()
                .filter(|ds| ds.page_id == page_id)
                .map(|ds| {
                    let key = self.key(ds);
                    let fingerprint = Fingerprint::new(ds.clone(), payload.clone());
                    let epoch = state.begin_fetch(key, page_id, fingerprint.clone());
                    (key, epoch, fingerprint)
                })
                .collect()
        };

        match self.inner.dispatcher.dispatch_all(page_id, &payload).await {
            Ok(mut results) => {
                for (key, epoch, fingerprint) in tickets {
                    let value = results
                        .remove(&fingerprint.data_source.id)
                        .filter(|value| !is_error_marker(value));
                    if value.is_none() {
                        log::debug!(
                            "No content for data source '{}' in page response",
                            fingerprint.data_source.name
                        );
                    }
                    self.inner.settle(key, epoch, fingerprint, value);
                }
                Ok(())
            }
            Err(source) => {
                log::warn!("Fetching data sources of page {page_id} failed: {source}");
                self.inner.state.lock().stats.failures += 1;
                self.clear_page(page_id);
                Err(CacheError::BatchDispatch { page_id, source })
            }
        }
    }

    /// Drop every entry of a page along with its scheduled refetches
    pub fn clear_page(&self, page_id: PageId) {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        state.entries.retain(|_, entry| entry.page_id != page_id);
        let entries = &state.entries;
        state.timers.retain(|key, timer| {
            let keep = entries.contains_key(key);
            if !keep {
                timer.abort();
            }
            keep
        });
    }

    /// Drop everything
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        state.entries.clear();
        state.stats = CacheStats::default();
    }
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ContentCache")
            .field("config", &self.inner.config)
            .field("entries", &state.entries.len())
            .field("stats", &state.stats)
            .finish()
    }
}
