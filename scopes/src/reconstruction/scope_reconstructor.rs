//! # Scope Reconstruction
//!
//! Pairs start and stop events into completed [`Timer`]s and routes them to
//! the listener.
//!
//! ## Pairing Rules
//!
//! - **Synchronous scopes** are nested: one stack per `(process, thread)`, a
//!   stop closes the innermost open scope of its own thread. Timers are emitted
//!   innermost first.
//! - **Async scopes** are matched by their full 64-bit id in one map shared by
//!   all threads. A second start with a pending id replaces the first (last
//!   start wins).
//!
//! ## Lossy Input
//!
//! The capture pipeline is best effort. A stop without a start, a repeated
//! async start and an undecodable legacy event are ordinary traffic: they are
//! discarded without telling the listener or the caller, and only counted in
//! [`DiscardStats`].

use log::{debug, warn};
use std::collections::HashMap;

use super::timer::{ApiStringEvent, ApiTrackValue, Timer, TimerKind};
use crate::domain::{Pid, Tid};
use crate::events::{
    decode_legacy_event, AsyncScopeStart, AsyncScopeStop, LegacyEvent, RawEvent, ScopeStart,
    ScopeStop, StringEvent, TrackEvent,
};
use crate::listener::CaptureListener;

/// A synchronous scope waiting for its stop
#[derive(Debug, Clone)]
struct OpenScope {
    name: String,
    timestamp_ns: u64,
    group_id: u64,
    address_in_function: u64,
    function_id: u64,
    color: u32,
    /// Number of scopes already open on the thread when this one started
    depth: u32,
}

/// An async scope waiting for the stop with the same id
#[derive(Debug, Clone)]
struct OpenAsyncScope {
    name: String,
    timestamp_ns: u64,
    address_in_function: u64,
    color: u32,
    process_id: i32,
    thread_id: i32,
}

/// Counters for input the reconstructor dropped
///
/// Purely informational: discards never surface as errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscardStats {
    /// Scope stops on a thread with no open scope
    pub unmatched_stops: u64,
    /// Async stops whose id had no pending start
    pub unmatched_async_stops: u64,
    /// Pending async starts replaced by a newer start with the same id
    pub overwritten_async_starts: u64,
    /// Legacy events with a none or unknown type tag
    pub undecodable_legacy_events: u64,
}

impl DiscardStats {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.unmatched_stops
            + self.unmatched_async_stops
            + self.overwritten_async_starts
            + self.undecodable_legacy_events
    }
}

/// Turns start/stop events into timers
pub struct ScopeReconstructor<L> {
    listener: L,

    // Mutable state
    open_scopes: HashMap<(Pid, Tid), Vec<OpenScope>>,
    open_async_scopes: HashMap<u64, OpenAsyncScope>,
    discards: DiscardStats,
    pub event_count: u64,
    pub timer_count: u64,
}

impl<L: CaptureListener> ScopeReconstructor<L> {
    #[must_use]
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            open_scopes: HashMap::new(),
            open_async_scopes: HashMap::new(),
            discards: DiscardStats::default(),
            event_count: 0,
            timer_count: 0,
        }
    }

    /// Process a single event
    pub fn process_event(&mut self, event: RawEvent) {
        match event {
            RawEvent::ScopeStart(e) => self.process_scope_start(e),
            RawEvent::ScopeStop(e) => self.process_scope_stop(&e),
            RawEvent::AsyncScopeStart(e) => self.process_async_scope_start(e),
            RawEvent::AsyncScopeStop(e) => self.process_async_scope_stop(&e),
            RawEvent::StringEvent(e) => self.process_string_event(e),
            RawEvent::TrackValue(e) => self.process_track_value(e),
        }
    }

    /// Demultiplex a legacy event and process it
    pub fn process_legacy_event(&mut self, event: &LegacyEvent) {
        match decode_legacy_event(event) {
            Ok(decoded) => self.process_event(decoded),
            Err(e) => {
                self.event_count += 1;
                self.discards.undecodable_legacy_events += 1;
                warn!(
                    "Discarding legacy event from {} {}: {e}",
                    Pid(event.process_id),
                    Tid(event.thread_id)
                );
            }
        }
    }

    pub fn process_scope_start(&mut self, event: ScopeStart) {
        self.event_count += 1;

        let key = (Pid(event.process_id), Tid(event.thread_id));
        let stack = self.open_scopes.entry(key).or_default();
        let depth = u32::try_from(stack.len()).unwrap_or(u32::MAX);
        stack.push(OpenScope {
            name: event.name,
            timestamp_ns: event.timestamp_ns,
            group_id: event.group_id,
            address_in_function: event.address_in_function,
            function_id: event.function_id,
            color: event.color,
            depth,
        });
    }

    pub fn process_scope_stop(&mut self, event: &ScopeStop) {
        self.event_count += 1;

        let key = (Pid(event.process_id), Tid(event.thread_id));
        let Some(open) = self.open_scopes.get_mut(&key).and_then(Vec::pop) else {
            self.discards.unmatched_stops += 1;
            debug!(
                "Discarding scope stop at {} on {} {}: no open scope",
                event.timestamp_ns, key.0, key.1
            );
            return;
        };

        self.emit_timer(Timer {
            start_ns: open.timestamp_ns,
            end_ns: event.timestamp_ns,
            process_id: event.process_id,
            thread_id: event.thread_id,
            name: open.name,
            depth: open.depth,
            group_id: open.group_id,
            async_scope_id: 0,
            address_in_function: open.address_in_function,
            function_id: open.function_id,
            color: open.color,
            kind: TimerKind::SyncScope,
            scope_id: None,
        });
    }

    pub fn process_async_scope_start(&mut self, event: AsyncScopeStart) {
        self.event_count += 1;

        let id = event.id;
        let open = OpenAsyncScope {
            name: event.name,
            timestamp_ns: event.timestamp_ns,
            address_in_function: event.address_in_function,
            color: event.color,
            process_id: event.process_id,
            thread_id: event.thread_id,
        };
        if let Some(replaced) = self.open_async_scopes.insert(id, open) {
            self.discards.overwritten_async_starts += 1;
            debug!(
                "Async scope {id:#x} restarted at {} before its stop, dropping start at {}",
                event.timestamp_ns, replaced.timestamp_ns
            );
        }
    }

    pub fn process_async_scope_stop(&mut self, event: &AsyncScopeStop) {
        self.event_count += 1;

        let Some(open) = self.open_async_scopes.remove(&event.id) else {
            self.discards.unmatched_async_stops += 1;
            debug!("Discarding async scope stop {:#x}: no pending start", event.id);
            return;
        };

        self.emit_timer(Timer {
            start_ns: open.timestamp_ns,
            end_ns: event.timestamp_ns,
            process_id: open.process_id,
            thread_id: open.thread_id,
            name: open.name,
            depth: 0,
            group_id: 0,
            async_scope_id: event.id,
            address_in_function: open.address_in_function,
            function_id: 0,
            color: open.color,
            kind: TimerKind::AsyncScope,
            scope_id: None,
        });
    }

    pub fn process_string_event(&mut self, event: StringEvent) {
        self.event_count += 1;

        self.listener.on_api_string_event(ApiStringEvent {
            timestamp_ns: event.timestamp_ns,
            process_id: event.process_id,
            thread_id: event.thread_id,
            async_scope_id: event.id,
            text: event.text,
            should_concatenate: event.should_concatenate,
        });
    }

    pub fn process_track_value(&mut self, event: TrackEvent) {
        self.event_count += 1;

        self.listener.on_api_track_value(ApiTrackValue {
            process_id: event.process_id,
            thread_id: event.thread_id,
            timestamp_ns: event.timestamp_ns,
            track_name: event.name,
            value: event.data.to_f64(),
        });
    }

    /// What has been dropped so far
    #[must_use]
    pub fn discard_stats(&self) -> DiscardStats {
        self.discards
    }

    /// Number of synchronous scopes still open, across all threads
    #[must_use]
    pub fn open_scope_count(&self) -> usize {
        self.open_scopes.values().map(Vec::len).sum()
    }

    /// Number of async scopes waiting for their stop
    #[must_use]
    pub fn pending_async_scope_count(&self) -> usize {
        self.open_async_scopes.len()
    }

    /// Tear down all open scopes and counters, keeping the listener
    pub fn reset(&mut self) {
        self.open_scopes.clear();
        self.open_async_scopes.clear();
        self.discards = DiscardStats::default();
        self.event_count = 0;
        self.timer_count = 0;
    }

    #[must_use]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    #[must_use]
    pub fn into_listener(self) -> L {
        self.listener
    }

    fn emit_timer(&mut self, timer: Timer) {
        self.timer_count += 1;
        self.listener.on_timer(timer);
    }
}
