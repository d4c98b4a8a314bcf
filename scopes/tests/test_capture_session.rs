use scopes::capture::{CaptureOptions, CaptureSession};
use scopes::domain::ScopeId;
use scopes::events::{RawEvent, ScopeStart, ScopeStop, TrackData, TrackEvent};
use scopes::listener::{CaptureMessage, ChannelListener};
use scopes::thread_state::{ThreadState, ThreadStateSlice, WakeupReason};
use std::thread;

const PID: i32 = 42;
const LARGE_INTEGER: u64 = 10_000_000_000_000_000;

fn start(name: &str, thread_id: i32, timestamp_ns: u64) -> RawEvent {
    RawEvent::ScopeStart(ScopeStart {
        timestamp_ns,
        process_id: PID,
        thread_id,
        name: name.to_string(),
        color: 0,
        group_id: 0,
        address_in_function: 0,
        function_id: 0,
    })
}

fn stop(thread_id: i32, timestamp_ns: u64) -> RawEvent {
    RawEvent::ScopeStop(ScopeStop { timestamp_ns, process_id: PID, thread_id })
}

#[test]
fn test_emissions_reach_consumer_thread_with_scope_ids() {
    let (listener, rx) = ChannelListener::bounded(64);
    let consumer = thread::spawn(move || rx.iter().collect::<Vec<_>>());

    let mut session = CaptureSession::new(listener, CaptureOptions::default());
    session.process_event(start("Frame", 12, 0));
    session.process_event(RawEvent::TrackValue(TrackEvent {
        timestamp_ns: 5,
        process_id: PID,
        thread_id: 12,
        name: "queue".to_string(),
        data: TrackData::Uint(3),
    }));
    session.process_event(stop(12, 10));
    let data = session.capture_data();
    drop(session);

    let messages = consumer.join().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(matches!(messages[0], CaptureMessage::TrackValue(ref t) if t.value == 3.0));
    let CaptureMessage::Timer(ref timer) = messages[1] else {
        panic!("expected a timer");
    };
    let scope_id = timer.scope_id.unwrap();
    assert_eq!(data.scope_stats_or_default(scope_id).count, 1);
}

#[test]
fn test_interleaved_threads_aggregate_with_large_timestamps() {
    let mut session = CaptureSession::new(None::<ChannelListener>, CaptureOptions::default());
    let base = LARGE_INTEGER;

    session.process_event(start("Work", 1, base + 10));
    session.process_event(start("Work", 2, base + 20));
    session.process_event(stop(1, base + 310));
    session.process_event(start("Work", 1, base + 400));
    session.process_event(stop(2, base + 120));
    session.process_event(stop(1, base + 600));
    let summary = session.on_capture_complete();

    assert_eq!(summary.timer_count, 3);
    let data = session.capture_data();
    let ids = data.all_scope_ids();
    assert_eq!(ids, vec![ScopeId(1)]);
    let stats = data.scope_stats_or_default(ids[0]);
    assert_eq!(stats.count, 3);
    assert!((stats.variance_ns - 6666.67).abs() < 1.0);
    assert_eq!(data.sorted_timer_durations(ids[0]), Some(vec![100, 200, 300]));
}

#[test]
fn test_thread_state_queries_through_capture_data() {
    let mut session = CaptureSession::new(None::<ChannelListener>, CaptureOptions::default());
    let slice = |state, begin_ns, end_ns| ThreadStateSlice {
        thread_id: 1000,
        state,
        begin_ns,
        end_ns,
        wakeup_reason: WakeupReason::NotApplicable,
        wakeup_thread_id: 0,
        wakeup_process_id: 0,
    };
    session.add_thread_state_slice(slice(ThreadState::InterruptibleSleep, 50, 100));
    session.add_thread_state_slice(slice(ThreadState::Runnable, 100, 150));
    session.add_thread_state_slice(slice(ThreadState::Running, 150, 200));

    let data = session.capture_data();
    let reader = thread::spawn(move || {
        [49, 75, 100, 199, 200].map(|ts| data.find_thread_state_slice(1000, ts).map(|s| s.state))
    });

    assert_eq!(
        reader.join().unwrap(),
        [
            None,
            Some(ThreadState::InterruptibleSleep),
            Some(ThreadState::Runnable),
            Some(ThreadState::Running),
            None,
        ]
    );
}
