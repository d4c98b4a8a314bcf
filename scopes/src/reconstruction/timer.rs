//! Records emitted by the reconstructor
//!
//! These are what a [`CaptureListener`](crate::listener::CaptureListener)
//! receives. All of them are immutable once emitted.

use serde::{Deserialize, Serialize};

use crate::domain::ScopeId;

/// Whether a timer came from a nested scope or an id-matched async scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    SyncScope,
    AsyncScope,
}

/// A completed scope
///
/// For async scopes the process and thread are those of the start event,
/// `depth` and `group_id` are always 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub start_ns: u64,
    pub end_ns: u64,
    pub process_id: i32,
    pub thread_id: i32,
    pub name: String,
    pub depth: u32,
    pub group_id: u64,
    /// 0 for synchronous scopes
    pub async_scope_id: u64,
    pub address_in_function: u64,
    /// Registered instrumented function, 0 for none
    #[serde(default)]
    pub function_id: u64,
    pub color: u32,
    pub kind: TimerKind,
    /// Assigned by the capture session; `None` straight out of the reconstructor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<ScopeId>,
}

impl Timer {
    /// `end_ns - start_ns`
    ///
    /// Producers guarantee `end_ns >= start_ns`; violations are caught in
    /// debug builds and saturate to 0 in release builds.
    #[must_use]
    pub fn duration_ns(&self) -> u64 {
        debug_assert!(
            self.end_ns >= self.start_ns,
            "timer '{}' ends ({}) before it starts ({})",
            self.name,
            self.end_ns,
            self.start_ns
        );
        self.end_ns.saturating_sub(self.start_ns)
    }
}

/// A string event as forwarded to the listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStringEvent {
    pub timestamp_ns: u64,
    pub process_id: i32,
    pub thread_id: i32,
    pub async_scope_id: u64,
    pub text: String,
    pub should_concatenate: bool,
}

/// A track sample with its value normalized to `f64`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTrackValue {
    pub process_id: i32,
    pub thread_id: i32,
    pub timestamp_ns: u64,
    pub track_name: String,
    pub value: f64,
}
