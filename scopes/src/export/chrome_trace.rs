//! Chrome Trace Event Format output
//!
//! Timers become complete (`"X"`) events, string events become instant
//! (`"i"`) events and track values become counter (`"C"`) events. The result
//! loads in `chrome://tracing` and Perfetto.

#![allow(clippy::cast_precision_loss)]

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::ExportError;
use crate::listener::CaptureListener;
use crate::reconstruction::{ApiStringEvent, ApiTrackValue, Timer, TimerKind};

/// One entry of `traceEvents`
#[derive(Debug, Clone, Serialize)]
struct ChromeTraceEvent {
    name: String,
    cat: &'static str,
    /// "X" = complete, "i" = instant, "C" = counter
    ph: &'static str,
    /// Microseconds since the earliest event of the trace
    ts: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    dur: Option<f64>,
    pid: i32,
    tid: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    s: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<HashMap<String, JsonValue>>,
}

#[derive(Debug, Serialize)]
struct ChromeTrace<'a> {
    #[serde(rename = "traceEvents")]
    trace_events: &'a [ChromeTraceEvent],
    #[serde(rename = "displayTimeUnit")]
    display_time_unit: &'static str,
}

/// An event before timestamps are made relative
#[derive(Debug, Clone)]
struct PendingEvent {
    timestamp_ns: u64,
    duration_ns: Option<u64>,
    event: ChromeTraceEvent,
}

/// Listener collecting everything it receives into a Chrome trace
#[derive(Debug, Default)]
pub struct ChromeTraceListener {
    events: Vec<PendingEvent>,
}

fn ns_to_us(ns: u64) -> f64 {
    ns as f64 / 1000.0
}

impl ChromeTraceListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trace events collected
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Write the trace as JSON to any writer
    ///
    /// # Errors
    /// Returns an error if serialization or the underlying writer fails.
    pub fn export<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        let base_ns = self.events.iter().map(|e| e.timestamp_ns).min().unwrap_or(0);
        let trace_events: Vec<ChromeTraceEvent> = self
            .events
            .iter()
            .map(|pending| ChromeTraceEvent {
                ts: ns_to_us(pending.timestamp_ns - base_ns),
                dur: pending.duration_ns.map(ns_to_us),
                ..pending.event.clone()
            })
            .collect();

        let trace = ChromeTrace { trace_events: &trace_events, display_time_unit: "ms" };
        serde_json::to_writer_pretty(&mut writer, &trace)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the trace to `path`, replacing any existing file
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.export(BufWriter::new(file))
    }

    fn push(&mut self, timestamp_ns: u64, duration_ns: Option<u64>, event: ChromeTraceEvent) {
        self.events.push(PendingEvent { timestamp_ns, duration_ns, event });
    }
}

impl CaptureListener for ChromeTraceListener {
    fn on_timer(&mut self, timer: Timer) {
        let cat = match timer.kind {
            TimerKind::SyncScope => "scope",
            TimerKind::AsyncScope => "async_scope",
        };

        let mut args = HashMap::new();
        args.insert("depth".to_string(), json!(timer.depth));
        if timer.group_id != 0 {
            args.insert("group_id".to_string(), json!(timer.group_id));
        }
        if timer.async_scope_id != 0 {
            args.insert("async_scope_id".to_string(), json!(timer.async_scope_id));
        }
        if let Some(scope_id) = timer.scope_id {
            args.insert("scope_id".to_string(), json!(scope_id.0));
        }

        let duration_ns = timer.duration_ns();
        self.push(
            timer.start_ns,
            Some(duration_ns),
            ChromeTraceEvent {
                name: timer.name,
                cat,
                ph: "X",
                ts: 0.0,
                dur: None,
                pid: timer.process_id,
                tid: timer.thread_id,
                s: None,
                args: Some(args),
            },
        );
    }

    fn on_api_string_event(&mut self, string_event: ApiStringEvent) {
        let mut args = HashMap::new();
        args.insert("id".to_string(), json!(string_event.async_scope_id));
        args.insert("text".to_string(), json!(string_event.text));

        self.push(
            string_event.timestamp_ns,
            None,
            ChromeTraceEvent {
                name: "string_event".to_string(),
                cat: "string_event",
                ph: "i",
                ts: 0.0,
                dur: None,
                pid: string_event.process_id,
                tid: string_event.thread_id,
                s: Some("t"),
                args: Some(args),
            },
        );
    }

    fn on_api_track_value(&mut self, track_value: ApiTrackValue) {
        let mut args = HashMap::new();
        args.insert("value".to_string(), json!(track_value.value));

        self.push(
            track_value.timestamp_ns,
            None,
            ChromeTraceEvent {
                name: track_value.track_name,
                cat: "track",
                ph: "C",
                ts: 0.0,
                dur: None,
                pid: track_value.process_id,
                tid: track_value.thread_id,
                s: None,
                args: Some(args),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScopeId;

    fn timer(name: &str, start_ns: u64, end_ns: u64) -> Timer {
        Timer {
            start_ns,
            end_ns,
            process_id: 42,
            thread_id: 12,
            name: name.to_string(),
            depth: 1,
            group_id: 0,
            async_scope_id: 0,
            address_in_function: 0,
            function_id: 0,
            color: 0,
            kind: TimerKind::SyncScope,
            scope_id: Some(ScopeId(3)),
        }
    }

    fn export_json(listener: &ChromeTraceListener) -> JsonValue {
        let mut buffer = Vec::new();
        listener.export(&mut buffer).unwrap();
        serde_json::from_slice(&buffer).unwrap()
    }

    #[test]
    fn test_timers_become_complete_events() {
        let mut listener = ChromeTraceListener::new();
        listener.on_timer(timer("Inner", 3_000, 4_000));
        listener.on_timer(timer("Outer", 1_000, 6_000));

        let trace = export_json(&listener);
        assert_eq!(trace["displayTimeUnit"], "ms");
        let events = trace["traceEvents"].as_array().unwrap();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0]["name"], "Inner");
        assert_eq!(events[0]["ph"], "X");
        assert_eq!(events[0]["ts"], 2.0);
        assert_eq!(events[0]["dur"], 1.0);
        assert_eq!(events[0]["args"]["scope_id"], 3);
        assert_eq!(events[1]["ts"], 0.0);
        assert_eq!(events[1]["dur"], 5.0);
    }

    #[test]
    fn test_string_and_track_events() {
        let mut listener = ChromeTraceListener::new();
        listener.on_api_string_event(ApiStringEvent {
            timestamp_ns: 2_000,
            process_id: 1,
            thread_id: 2,
            async_scope_id: 9,
            text: "hello".to_string(),
            should_concatenate: false,
        });
        listener.on_api_track_value(ApiTrackValue {
            process_id: 1,
            thread_id: 2,
            timestamp_ns: 1_000,
            track_name: "fps".to_string(),
            value: 60.0,
        });

        let trace = export_json(&listener);
        let events = trace["traceEvents"].as_array().unwrap();
        assert_eq!(events[0]["ph"], "i");
        assert_eq!(events[0]["ts"], 1.0);
        assert_eq!(events[0]["args"]["text"], "hello");
        assert!(events[0].get("dur").is_none());
        assert_eq!(events[1]["ph"], "C");
        assert_eq!(events[1]["name"], "fps");
        assert_eq!(events[1]["args"]["value"], 60.0);
    }

    #[test]
    fn test_empty_trace() {
        let trace = export_json(&ChromeTraceListener::new());
        assert!(trace["traceEvents"].as_array().unwrap().is_empty());
    }
}
