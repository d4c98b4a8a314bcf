//! Demultiplexing of legacy encoded events
//!
//! Older instrumentation sends every kind of event as one six-word
//! [`EncodedEvent`]. The type tag selects which typed event it becomes; scope
//! stops and async stops carry no name, and track events carry the bit
//! pattern of their numeric value in the data word.

use scopes_common::{
    EncodedEvent, ENCODED_EVENT_WORDS, EVENT_NONE, EVENT_SCOPE_START, EVENT_SCOPE_START_ASYNC,
    EVENT_SCOPE_STOP, EVENT_SCOPE_STOP_ASYNC, EVENT_STRING, EVENT_TRACK_DOUBLE,
    EVENT_TRACK_FLOAT, EVENT_TRACK_INT, EVENT_TRACK_INT64, EVENT_TRACK_UINT,
    EVENT_TRACK_UINT64,
};
use serde::{Deserialize, Serialize};

use super::{
    AsyncScopeStart, AsyncScopeStop, RawEvent, ScopeStart, ScopeStop, StringEvent, TrackData,
    TrackEvent,
};
use crate::domain::LegacyDecodeError;

/// A legacy event as delivered by the transport: origin plus six raw words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyEvent {
    pub timestamp_ns: u64,
    pub process_id: i32,
    pub thread_id: i32,
    pub args: [u64; ENCODED_EVENT_WORDS],
}

impl LegacyEvent {
    #[must_use]
    pub fn new(timestamp_ns: u64, process_id: i32, thread_id: i32, encoded: EncodedEvent) -> Self {
        Self { timestamp_ns, process_id, thread_id, args: encoded.args }
    }

    #[must_use]
    pub fn encoded(&self) -> EncodedEvent {
        EncodedEvent::from_args(self.args)
    }
}

/// Decode a legacy event into exactly one typed event
///
/// Legacy scope starts have no group id and no address in function; both are
/// reported as 0. Names that are not valid UTF-8 are decoded lossily.
///
/// # Errors
/// Returns an error for the "none" type tag and for unknown type tags.
pub fn decode_legacy_event(event: &LegacyEvent) -> Result<RawEvent, LegacyDecodeError> {
    let encoded = event.encoded();
    let timestamp_ns = event.timestamp_ns;
    let process_id = event.process_id;
    let thread_id = event.thread_id;

    let decoded = match encoded.event_type() {
        EVENT_SCOPE_START => RawEvent::ScopeStart(ScopeStart {
            timestamp_ns,
            process_id,
            thread_id,
            name: decode_name(&encoded),
            color: encoded.color(),
            group_id: 0,
            address_in_function: 0,
            function_id: 0,
        }),
        EVENT_SCOPE_STOP => RawEvent::ScopeStop(ScopeStop { timestamp_ns, process_id, thread_id }),
        EVENT_SCOPE_START_ASYNC => RawEvent::AsyncScopeStart(AsyncScopeStart {
            timestamp_ns,
            process_id,
            thread_id,
            name: decode_name(&encoded),
            id: encoded.data(),
            color: encoded.color(),
            address_in_function: 0,
        }),
        EVENT_SCOPE_STOP_ASYNC => RawEvent::AsyncScopeStop(AsyncScopeStop {
            timestamp_ns,
            process_id,
            thread_id,
            id: encoded.data(),
        }),
        EVENT_STRING => RawEvent::StringEvent(StringEvent {
            timestamp_ns,
            process_id,
            thread_id,
            id: encoded.data(),
            text: decode_name(&encoded),
            should_concatenate: true,
        }),
        track_type @ EVENT_TRACK_INT..=EVENT_TRACK_DOUBLE => RawEvent::TrackValue(TrackEvent {
            timestamp_ns,
            process_id,
            thread_id,
            name: decode_name(&encoded),
            data: decode_track_data(track_type, encoded.data()),
        }),
        EVENT_NONE => return Err(LegacyDecodeError::NoneType { version: encoded.version() }),
        event_type => {
            return Err(LegacyDecodeError::UnknownType { event_type, version: encoded.version() })
        }
    };

    Ok(decoded)
}

fn decode_name(encoded: &EncodedEvent) -> String {
    let field = encoded.name_field();
    String::from_utf8_lossy(&field[..encoded.name_len()]).into_owned()
}

/// Reinterpret the data word according to the track kind
///
/// 32-bit kinds live in the low half of the word; the high half is ignored.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn decode_track_data(track_type: u8, data: u64) -> TrackData {
    let low = data as u32;
    match track_type {
        EVENT_TRACK_INT => TrackData::Int(low as i32),
        EVENT_TRACK_INT64 => TrackData::Int64(data as i64),
        EVENT_TRACK_UINT => TrackData::Uint(low),
        EVENT_TRACK_UINT64 => TrackData::Uint64(data),
        EVENT_TRACK_FLOAT => TrackData::Float(f32::from_bits(low)),
        _ => TrackData::Double(f64::from_bits(data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PID: i32 = 42;
    const TID: i32 = 12;

    fn legacy(timestamp_ns: u64, encoded: EncodedEvent) -> LegacyEvent {
        LegacyEvent::new(timestamp_ns, PID, TID, encoded)
    }

    fn decode_track(encoded: EncodedEvent) -> TrackEvent {
        match decode_legacy_event(&legacy(1, encoded)) {
            Ok(RawEvent::TrackValue(track)) => track,
            other => panic!("expected track value, got {other:?}"),
        }
    }

    #[test]
    fn test_scope_start_has_no_group_or_address() {
        let event = legacy(3, EncodedEvent::new(EVENT_SCOPE_START, Some("Scope0"), 0, 0x11));
        let decoded = decode_legacy_event(&event).unwrap();
        assert_eq!(
            decoded,
            RawEvent::ScopeStart(ScopeStart {
                timestamp_ns: 3,
                process_id: PID,
                thread_id: TID,
                name: "Scope0".to_string(),
                color: 0x11,
                group_id: 0,
                address_in_function: 0,
                function_id: 0,
            })
        );
    }

    #[test]
    fn test_stops_decode_without_name() {
        let stop = decode_legacy_event(&legacy(4, EncodedEvent::new(EVENT_SCOPE_STOP, None, 0, 0)));
        assert_eq!(
            stop,
            Ok(RawEvent::ScopeStop(ScopeStop { timestamp_ns: 4, process_id: PID, thread_id: TID }))
        );

        let async_stop =
            decode_legacy_event(&legacy(5, EncodedEvent::new(EVENT_SCOPE_STOP_ASYNC, None, 99, 0)));
        assert_eq!(
            async_stop,
            Ok(RawEvent::AsyncScopeStop(AsyncScopeStop {
                timestamp_ns: 5,
                process_id: PID,
                thread_id: TID,
                id: 99,
            }))
        );
    }

    #[test]
    fn test_async_start_takes_id_from_data_word() {
        let event =
            legacy(1, EncodedEvent::new(EVENT_SCOPE_START_ASYNC, Some("Async"), 0xFF_0000_001D, 0));
        let Ok(RawEvent::AsyncScopeStart(start)) = decode_legacy_event(&event) else {
            panic!("expected async scope start");
        };
        assert_eq!(start.id, 0xFF_0000_001D);
        assert_eq!(start.name, "Async");
        assert_eq!(start.address_in_function, 0);
    }

    #[test]
    fn test_string_event_requests_concatenation() {
        let event = legacy(1, EncodedEvent::new(EVENT_STRING, Some("Some string"), 89, 0));
        let Ok(RawEvent::StringEvent(string_event)) = decode_legacy_event(&event) else {
            panic!("expected string event");
        };
        assert_eq!(string_event.id, 89);
        assert_eq!(string_event.text, "Some string");
        assert!(string_event.should_concatenate);
    }

    #[test]
    fn test_track_values_decode_per_kind() {
        assert_eq!(decode_track(EncodedEvent::track("t", 3i32, 0)).data, TrackData::Int(3));
        assert_eq!(decode_track(EncodedEvent::track("t", -3i32, 0)).data, TrackData::Int(-3));
        assert_eq!(
            decode_track(EncodedEvent::track("t", i64::MAX, 0)).data,
            TrackData::Int64(i64::MAX)
        );
        assert_eq!(
            decode_track(EncodedEvent::track("t", u32::MAX, 0)).data,
            TrackData::Uint(u32::MAX)
        );
        assert_eq!(
            decode_track(EncodedEvent::track("t", u64::MAX, 0)).data,
            TrackData::Uint64(u64::MAX)
        );
        assert_eq!(decode_track(EncodedEvent::track("t", 1.75f32, 0)).data, TrackData::Float(1.75));
        assert_eq!(decode_track(EncodedEvent::track("t", 0.1f64, 0)).data, TrackData::Double(0.1));
        assert_eq!(decode_track(EncodedEvent::track("Some name", 1u32, 0)).name, "Some name");
    }

    #[test]
    fn test_none_and_unknown_types_are_rejected() {
        let zeroed = legacy(1, EncodedEvent::from_args([0; ENCODED_EVENT_WORDS]));
        assert_eq!(decode_legacy_event(&zeroed), Err(LegacyDecodeError::NoneType { version: 0 }));

        let unknown = legacy(1, EncodedEvent::new(200, Some("x"), 0, 0));
        assert_eq!(
            decode_legacy_event(&unknown),
            Err(LegacyDecodeError::UnknownType { event_type: 200, version: 2 })
        );
    }
}
