//! # Thread-State Interval Index
//!
//! Answers "what was thread T doing at time X".
//!
//! Slices arrive per thread in ascending order and never overlap, so each
//! thread's slices form a sorted sequence of half-open `[begin_ns, end_ns)`
//! intervals. A lookup is a binary search for the last slice starting at or
//! before the timestamp, followed by a containment check on its end.
//!
//! Gaps between slices are allowed; a timestamp inside a gap finds nothing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::Tid;

// =============================================================================
// SLICE TYPES
// =============================================================================

/// Scheduling state of a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreadState {
    #[default]
    Unknown,
    Running,
    Runnable,
    InterruptibleSleep,
    UninterruptibleSleep,
    Stopped,
    Traced,
    Dead,
    Zombie,
    Parked,
    Idle,
}

/// Why a thread became runnable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WakeupReason {
    #[default]
    NotApplicable,
    Unblocked,
    Created,
}

/// One interval `[begin_ns, end_ns)` of a thread in a single state
///
/// The wakeup fields name the thread that made this one runnable; they are 0
/// when `wakeup_reason` is [`WakeupReason::NotApplicable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadStateSlice {
    pub thread_id: i32,
    pub state: ThreadState,
    pub begin_ns: u64,
    pub end_ns: u64,
    #[serde(default)]
    pub wakeup_reason: WakeupReason,
    #[serde(default)]
    pub wakeup_thread_id: i32,
    #[serde(default)]
    pub wakeup_process_id: i32,
}

impl ThreadStateSlice {
    /// True if `timestamp_ns` falls inside `[begin_ns, end_ns)`
    #[must_use]
    pub fn contains(&self, timestamp_ns: u64) -> bool {
        self.begin_ns <= timestamp_ns && timestamp_ns < self.end_ns
    }
}

// =============================================================================
// INDEX
// =============================================================================

/// Append-only per-thread collection of slices
#[derive(Debug, Default)]
pub struct ThreadStateIndex {
    slices: HashMap<Tid, Vec<ThreadStateSlice>>,
}

impl ThreadStateIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slice to its thread
    ///
    /// Slices of one thread must be added in ascending, non-overlapping order.
    pub fn add_thread_state_slice(&mut self, slice: ThreadStateSlice) {
        let thread_slices = self.slices.entry(Tid(slice.thread_id)).or_default();
        debug_assert!(
            !matches!(thread_slices.last(), Some(last) if last.end_ns > slice.begin_ns),
            "thread state slice [{}, {}) added out of order",
            slice.begin_ns,
            slice.end_ns
        );
        thread_slices.push(slice);
    }

    /// The slice of `thread_id` containing `timestamp_ns`
    #[must_use]
    pub fn find_thread_state_slice(
        &self,
        thread_id: i32,
        timestamp_ns: u64,
    ) -> Option<&ThreadStateSlice> {
        let thread_slices = self.slices.get(&Tid(thread_id))?;
        let after = thread_slices.partition_point(|slice| slice.begin_ns <= timestamp_ns);
        let candidate = thread_slices.get(after.checked_sub(1)?)?;
        candidate.contains(timestamp_ns).then_some(candidate)
    }

    /// All slices of `thread_id` in order, empty for unknown threads
    #[must_use]
    pub fn slices_for_thread(&self, thread_id: i32) -> &[ThreadStateSlice] {
        self.slices.get(&Tid(thread_id)).map_or(&[], Vec::as_slice)
    }

    /// Threads with at least one slice, ascending
    #[must_use]
    pub fn thread_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.slices.keys().map(|tid| tid.0).collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.slices.values().map(Vec::len).sum()
    }
}
