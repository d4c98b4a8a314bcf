//! Per-scope aggregation of completed timers.
//!
//! Two independent paths exist for every scope id:
//!
//! - **Statistics** ([`ScopeStats`]), updated in O(1) per timer and never
//!   looking at past samples
//! - **Duration lists**, kept raw so that percentiles and histograms can be
//!   computed; sorted lazily on first query and cached
//!
//! ## Data Flow
//!
//! ```text
//! Timer (with ScopeId)
//!     │
//!     ├──► update_scope_stats()     ← O(1) running summary
//!     │
//!     └──► record_timer_duration()  ← raw list, sorted on demand
//! ```

use log::debug;
use std::collections::{HashMap, HashSet};

use super::scope_stats::ScopeStats;
use crate::domain::ScopeId;
use crate::reconstruction::Timer;

/// Statistics and duration lists keyed by scope id
#[derive(Debug, Default)]
pub struct ScopeStatsAggregator {
    stats: HashMap<ScopeId, ScopeStats>,
    durations: HashMap<ScopeId, Vec<u64>>,
    /// Ids whose duration list is currently in ascending order
    sorted: HashSet<ScopeId>,
}

impl ScopeStatsAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the timer's duration into the statistics of `scope_id`
    ///
    /// Timers without a valid scope id are ignored.
    pub fn update_scope_stats(&mut self, scope_id: ScopeId, timer: &Timer) {
        if !scope_id.is_valid() {
            return;
        }
        self.stats.entry(scope_id).or_default().update(timer.duration_ns());
    }

    /// Statistics for `scope_id`, zeros if it was never observed
    #[must_use]
    pub fn scope_stats_or_default(&self, scope_id: ScopeId) -> ScopeStats {
        self.stats.get(&scope_id).copied().unwrap_or_default()
    }

    /// Append the timer's raw duration to the list of `scope_id`
    ///
    /// Lists of other ids keep their sorted state.
    pub fn record_timer_duration(&mut self, scope_id: ScopeId, timer: &Timer) {
        if !scope_id.is_valid() {
            return;
        }
        if self.sorted.remove(&scope_id) {
            debug!("{scope_id} received a duration after being sorted, resorting on next query");
        }
        self.durations.entry(scope_id).or_default().push(timer.duration_ns());
    }

    /// Durations of `scope_id` in ascending order
    ///
    /// Sorts on the first call and serves the cached order afterwards.
    /// Returns `None` if no duration was ever recorded for the id.
    pub fn sorted_timer_durations(&mut self, scope_id: ScopeId) -> Option<&[u64]> {
        let durations = self.durations.get_mut(&scope_id)?;
        if self.sorted.insert(scope_id) {
            durations.sort_unstable();
        }
        Some(durations.as_slice())
    }

    /// Lower median of the durations of `scope_id`, `sorted[(n - 1) / 2]`
    pub fn median_timer_duration(&mut self, scope_id: ScopeId) -> Option<u64> {
        let durations = self.sorted_timer_durations(scope_id)?;
        durations.get(durations.len().saturating_sub(1) / 2).copied()
    }

    /// Sort every duration list now, so later queries are pure lookups
    pub fn on_capture_complete(&mut self) {
        for (scope_id, durations) in &mut self.durations {
            if self.sorted.insert(*scope_id) {
                durations.sort_unstable();
            }
        }
    }

    /// Every id with statistics, ascending
    #[must_use]
    pub fn all_scope_ids(&self) -> Vec<ScopeId> {
        let mut ids: Vec<ScopeId> = self.stats.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
