//! Shared results of one capture
//!
//! [`CaptureData`] is written by the ingesting thread and may be queried from
//! any other thread through an `Arc`. Each structure has its own mutex, and
//! every method holds one lock for the duration of the call only.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::CaptureOptions;
use crate::analysis::{NameEqualityScopeIdProvider, ScopeInfo, ScopeStats, ScopeStatsAggregator};
use crate::domain::ScopeId;
use crate::reconstruction::Timer;
use crate::thread_state::{ThreadStateIndex, ThreadStateSlice};

/// Statistics, duration lists, thread states and scope ids of one capture
#[derive(Debug)]
pub struct CaptureData {
    aggregator: Mutex<ScopeStatsAggregator>,
    thread_states: Mutex<ThreadStateIndex>,
    scope_ids: Mutex<NameEqualityScopeIdProvider>,
}

/// Every update leaves the guarded value consistent, so a poisoned lock is
/// still safe to use
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CaptureData {
    #[must_use]
    pub fn new(options: &CaptureOptions) -> Self {
        Self {
            aggregator: Mutex::new(ScopeStatsAggregator::new()),
            thread_states: Mutex::new(ThreadStateIndex::new()),
            scope_ids: Mutex::new(NameEqualityScopeIdProvider::new(
                &options.instrumented_functions,
            )),
        }
    }

    // -------------------------------------------------------------------------
    // Ingestion
    // -------------------------------------------------------------------------

    pub(crate) fn provide_scope_id(&self, timer: &Timer) -> ScopeId {
        lock(&self.scope_ids).provide_id(timer)
    }

    pub(crate) fn add_timer(&self, scope_id: ScopeId, timer: &Timer, record_duration: bool) {
        let mut aggregator = lock(&self.aggregator);
        aggregator.update_scope_stats(scope_id, timer);
        if record_duration {
            aggregator.record_timer_duration(scope_id, timer);
        }
    }

    pub(crate) fn add_thread_state_slice(&self, slice: ThreadStateSlice) {
        lock(&self.thread_states).add_thread_state_slice(slice);
    }

    pub(crate) fn on_capture_complete(&self) {
        lock(&self.aggregator).on_capture_complete();
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Statistics for `scope_id`, zeros if it was never observed
    #[must_use]
    pub fn scope_stats_or_default(&self, scope_id: ScopeId) -> ScopeStats {
        lock(&self.aggregator).scope_stats_or_default(scope_id)
    }

    /// Ascending durations of `scope_id`, copied out of the cache
    #[must_use]
    pub fn sorted_timer_durations(&self, scope_id: ScopeId) -> Option<Vec<u64>> {
        lock(&self.aggregator).sorted_timer_durations(scope_id).map(<[u64]>::to_vec)
    }

    /// Lower median duration of `scope_id`, without copying the list
    #[must_use]
    pub fn median_timer_duration(&self, scope_id: ScopeId) -> Option<u64> {
        lock(&self.aggregator).median_timer_duration(scope_id)
    }

    /// Scope ids with statistics, ascending
    #[must_use]
    pub fn all_scope_ids(&self) -> Vec<ScopeId> {
        lock(&self.aggregator).all_scope_ids()
    }

    #[must_use]
    pub fn find_thread_state_slice(
        &self,
        thread_id: i32,
        timestamp_ns: u64,
    ) -> Option<ThreadStateSlice> {
        lock(&self.thread_states).find_thread_state_slice(thread_id, timestamp_ns).cloned()
    }

    #[must_use]
    pub fn thread_state_slice_count(&self) -> usize {
        lock(&self.thread_states).slice_count()
    }

    #[must_use]
    pub fn scope_info(&self, scope_id: ScopeId) -> Option<ScopeInfo> {
        lock(&self.scope_ids).scope_info(scope_id).cloned()
    }

    #[must_use]
    pub fn function_id_to_scope_id(&self, function_id: u64) -> Option<ScopeId> {
        lock(&self.scope_ids).function_id_to_scope_id(function_id)
    }
}
