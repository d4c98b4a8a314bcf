//! # Capture Session
//!
//! One capture from start to completion: the reconstructor state, the shared
//! [`CaptureData`] and the host's listener.
//!
//! ## Data Flow
//!
//! ```text
//! RawEvent / LegacyEvent
//!     │
//!     ▼
//! ScopeReconstructor ──► CaptureDataSink ──► scope id, stats, durations
//!                               │
//!                               ▼
//!                        host CaptureListener
//!
//! ThreadStateSlice ──────────────────────► ThreadStateIndex
//! ```
//!
//! Every timer reaches the host listener with its `scope_id` filled in, and
//! only after it has been aggregated. No capture data lock is held while the
//! host listener runs.

use log::info;
use std::sync::Arc;

use super::{CaptureData, CaptureOptions};
use crate::events::{LegacyEvent, RawEvent};
use crate::listener::CaptureListener;
use crate::reconstruction::{ApiStringEvent, ApiTrackValue, DiscardStats, ScopeReconstructor, Timer};
use crate::thread_state::ThreadStateSlice;

/// Tees every emission into the capture data before forwarding it
struct CaptureDataSink<L> {
    data: Arc<CaptureData>,
    record_durations: bool,
    listener: L,
}

impl<L: CaptureListener> CaptureListener for CaptureDataSink<L> {
    fn on_timer(&mut self, mut timer: Timer) {
        let scope_id = self.data.provide_scope_id(&timer);
        self.data.add_timer(scope_id, &timer, self.record_durations);
        timer.scope_id = Some(scope_id);
        self.listener.on_timer(timer);
    }

    fn on_api_string_event(&mut self, string_event: ApiStringEvent) {
        self.listener.on_api_string_event(string_event);
    }

    fn on_api_track_value(&mut self, track_value: ApiTrackValue) {
        self.listener.on_api_track_value(track_value);
    }
}

/// Counts reported when a capture completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSummary {
    pub event_count: u64,
    pub timer_count: u64,
    pub scope_count: usize,
    pub thread_state_slice_count: usize,
    pub discards: DiscardStats,
    /// Scopes still open when the capture completed; they never produce timers
    pub open_scopes: usize,
    pub pending_async_scopes: usize,
}

/// Owner of everything belonging to one capture
pub struct CaptureSession<L> {
    options: CaptureOptions,
    data: Arc<CaptureData>,
    reconstructor: ScopeReconstructor<CaptureDataSink<L>>,
}

impl<L: CaptureListener> CaptureSession<L> {
    #[must_use]
    pub fn new(listener: L, options: CaptureOptions) -> Self {
        let data = Arc::new(CaptureData::new(&options));
        let sink = CaptureDataSink {
            data: Arc::clone(&data),
            record_durations: options.record_durations,
            listener,
        };
        Self { options, data, reconstructor: ScopeReconstructor::new(sink) }
    }

    pub fn process_event(&mut self, event: RawEvent) {
        self.reconstructor.process_event(event);
    }

    pub fn process_legacy_event(&mut self, event: &LegacyEvent) {
        self.reconstructor.process_legacy_event(event);
    }

    pub fn add_thread_state_slice(&mut self, slice: ThreadStateSlice) {
        self.data.add_thread_state_slice(slice);
    }

    /// Handle to this capture's data, usable from other threads
    #[must_use]
    pub fn capture_data(&self) -> Arc<CaptureData> {
        Arc::clone(&self.data)
    }

    /// Sort all duration lists and report what the capture contained
    pub fn on_capture_complete(&mut self) -> CaptureSummary {
        self.data.on_capture_complete();

        let summary = CaptureSummary {
            event_count: self.reconstructor.event_count,
            timer_count: self.reconstructor.timer_count,
            scope_count: self.data.all_scope_ids().len(),
            thread_state_slice_count: self.data.thread_state_slice_count(),
            discards: self.reconstructor.discard_stats(),
            open_scopes: self.reconstructor.open_scope_count(),
            pending_async_scopes: self.reconstructor.pending_async_scope_count(),
        };
        info!(
            "Capture complete: {} events, {} timers in {} scopes, {} thread state slices, {} discarded",
            summary.event_count,
            summary.timer_count,
            summary.scope_count,
            summary.thread_state_slice_count,
            summary.discards.total()
        );
        summary
    }

    /// Start over with an empty capture
    ///
    /// Handles obtained from [`capture_data`](Self::capture_data) before the
    /// reset keep referring to the previous capture.
    pub fn reset(&mut self) {
        self.reconstructor.reset();
        self.data = Arc::new(CaptureData::new(&self.options));
        self.reconstructor.listener_mut().data = Arc::clone(&self.data);
    }

    #[must_use]
    pub fn discard_stats(&self) -> DiscardStats {
        self.reconstructor.discard_stats()
    }

    #[must_use]
    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    #[must_use]
    pub fn listener(&self) -> &L {
        &self.reconstructor.listener().listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.reconstructor.listener_mut().listener
    }

    #[must_use]
    pub fn into_listener(self) -> L {
        self.reconstructor.into_listener().listener
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{InstrumentedFunction, ScopeType};
    use crate::domain::ScopeId;
    use crate::events::{AsyncScopeStart, AsyncScopeStop, ScopeStart, ScopeStop};
    use crate::listener::RecordingListener;
    use crate::thread_state::{ThreadState, WakeupReason};

    fn start(name: &str, timestamp_ns: u64) -> RawEvent {
        RawEvent::ScopeStart(ScopeStart {
            timestamp_ns,
            process_id: 42,
            thread_id: 12,
            name: name.to_string(),
            color: 0,
            group_id: 0,
            address_in_function: 0,
            function_id: 0,
        })
    }

    fn stop(timestamp_ns: u64) -> RawEvent {
        RawEvent::ScopeStop(ScopeStop { timestamp_ns, process_id: 42, thread_id: 12 })
    }

    fn session() -> CaptureSession<RecordingListener> {
        CaptureSession::new(RecordingListener::new(), CaptureOptions::default())
    }

    #[test]
    fn test_timers_forwarded_with_scope_id_after_aggregation() {
        let mut session = session();
        for (begin, end) in [(0, 300), (400, 500), (600, 800)] {
            session.process_event(start("Frame", begin));
            session.process_event(stop(end));
        }

        let timers = &session.listener().timers;
        assert_eq!(timers.len(), 3);
        let scope_id = timers[0].scope_id.unwrap();
        assert!(timers.iter().all(|t| t.scope_id == Some(scope_id)));

        let data = session.capture_data();
        assert_eq!(data.scope_stats_or_default(scope_id).count, 3);
        assert_eq!(data.sorted_timer_durations(scope_id), Some(vec![100, 200, 300]));
    }

    #[test]
    fn test_sync_and_async_scopes_with_same_name_aggregate_separately() {
        let mut session = session();
        session.process_event(start("Load", 0));
        session.process_event(stop(10));
        session.process_event(RawEvent::AsyncScopeStart(AsyncScopeStart {
            timestamp_ns: 0,
            process_id: 42,
            thread_id: 12,
            name: "Load".to_string(),
            id: 5,
            color: 0,
            address_in_function: 0,
        }));
        session.process_event(RawEvent::AsyncScopeStop(AsyncScopeStop {
            timestamp_ns: 50,
            process_id: 42,
            thread_id: 13,
            id: 5,
        }));

        let timers = &session.listener().timers;
        assert_ne!(timers[0].scope_id, timers[1].scope_id);
        assert_eq!(session.capture_data().all_scope_ids().len(), 2);
    }

    #[test]
    fn test_generated_ids_start_above_instrumented_functions() {
        let options = CaptureOptions {
            instrumented_functions: vec![InstrumentedFunction {
                function_id: 10,
                name: "main".to_string(),
            }],
            record_durations: true,
        };
        let mut session = CaptureSession::new(RecordingListener::new(), options);
        session.process_event(start("Frame", 0));
        session.process_event(stop(1));

        assert_eq!(session.listener().timers[0].scope_id, Some(ScopeId(11)));
        assert_eq!(session.capture_data().function_id_to_scope_id(10), Some(ScopeId(10)));
    }

    #[test]
    fn test_timer_with_function_id_aggregates_under_function() {
        let options = CaptureOptions {
            instrumented_functions: vec![InstrumentedFunction {
                function_id: 10,
                name: "main".to_string(),
            }],
            record_durations: true,
        };
        let mut session = CaptureSession::new(RecordingListener::new(), options);
        for (begin, end) in [(0, 40), (50, 70)] {
            let RawEvent::ScopeStart(mut event) = start("main()", begin) else {
                unreachable!();
            };
            event.function_id = 10;
            session.process_event(RawEvent::ScopeStart(event));
            session.process_event(stop(end));
        }

        let timers = &session.listener().timers;
        assert!(timers.iter().all(|t| t.function_id == 10 && t.scope_id == Some(ScopeId(10))));

        let data = session.capture_data();
        assert_eq!(data.all_scope_ids(), vec![ScopeId(10)]);
        assert_eq!(data.scope_stats_or_default(ScopeId(10)).count, 2);
        assert_eq!(data.median_timer_duration(ScopeId(10)), Some(20));
        assert_eq!(
            data.scope_info(ScopeId(10)).map(|info| info.scope_type),
            Some(ScopeType::InstrumentedFunction)
        );
    }

    #[test]
    fn test_capture_complete_summary() {
        let mut session = session();
        session.process_event(start("Frame", 0));
        session.process_event(stop(10));
        session.process_event(stop(20));
        session.process_event(start("Open", 30));
        session.add_thread_state_slice(ThreadStateSlice {
            thread_id: 12,
            state: ThreadState::Running,
            begin_ns: 0,
            end_ns: 40,
            wakeup_reason: WakeupReason::NotApplicable,
            wakeup_thread_id: 0,
            wakeup_process_id: 0,
        });

        let summary = session.on_capture_complete();
        assert_eq!(summary.event_count, 4);
        assert_eq!(summary.timer_count, 1);
        assert_eq!(summary.scope_count, 1);
        assert_eq!(summary.thread_state_slice_count, 1);
        assert_eq!(summary.discards.unmatched_stops, 1);
        assert_eq!(summary.open_scopes, 1);
        assert_eq!(summary.pending_async_scopes, 0);
    }

    #[test]
    fn test_reset_starts_a_new_capture() {
        let mut session = session();
        session.process_event(start("Frame", 0));
        session.process_event(stop(10));
        let previous = session.capture_data();

        session.reset();
        session.process_event(stop(20));

        assert_eq!(previous.all_scope_ids().len(), 1);
        assert!(session.capture_data().all_scope_ids().is_empty());
        assert_eq!(session.discard_stats().unmatched_stops, 1);
        // The host listener is kept across captures
        assert_eq!(session.listener().timers.len(), 1);
    }
}
