//! # Legacy Encoded Event Layout (producer ↔ consumer)
//!
//! Defines the fixed-size wire layout of the legacy instrumentation event and
//! the constants shared between the instrumented process (which encodes
//! events) and the capture core (which decodes them). The layout is six
//! little-endian `u64` argument words, 48 bytes in total, so that producers can
//! pass an event through six integer registers without allocating.
//!
//! ## Word Layout
//!
//! ```text
//! word 0   byte 0: version | byte 1: event type | bytes 2-3: reserved | bytes 4-7: color
//! word 1   data (async id, string id, or the bit pattern of a track value)
//! word 2-5 name (UTF-8, NUL-padded, at most 32 bytes)
//! ```
//!
//! ## Key Types
//!
//! - [`EncodedEvent`] - The six-word event itself
//! - [`TrackBits`] - Bit packing of the six numeric track kinds into the data word

#![cfg_attr(not(test), no_std)]

// ============================================================================
// Format Constants
// ============================================================================

/// Format version written by [`EncodedEvent::new`]
pub const LEGACY_FORMAT_VERSION: u8 = 2;

/// Number of `u64` argument words in an encoded event
pub const ENCODED_EVENT_WORDS: usize = 6;

/// Maximum number of name bytes an encoded event can carry
///
/// Longer names are truncated by the encoder. String events work around the
/// limit by splitting text into fragments that the consumer concatenates.
pub const MAX_ENCODED_NAME_LEN: usize = 32;

const NAME_FIRST_WORD: usize = 2;

// ============================================================================
// Event Type Constants
// ============================================================================

/// Placeholder type of a zeroed event, never valid on the wire
pub const EVENT_NONE: u8 = 0;

/// **Synchronous scope start**: name in the name field
///
/// Paired with: `EVENT_SCOPE_STOP` on the same thread
pub const EVENT_SCOPE_START: u8 = 1;

/// **Synchronous scope stop**: carries no name
pub const EVENT_SCOPE_STOP: u8 = 2;

/// **Asynchronous scope start**: name in the name field, id in the data word
///
/// Paired with: `EVENT_SCOPE_STOP_ASYNC` with the same id, on any thread
pub const EVENT_SCOPE_START_ASYNC: u8 = 3;

/// **Asynchronous scope stop**: id in the data word, carries no name
pub const EVENT_SCOPE_STOP_ASYNC: u8 = 4;

/// Track sample, `i32` in the low 32 bits of the data word
pub const EVENT_TRACK_INT: u8 = 5;

/// Track sample, `i64` two's complement in the data word
pub const EVENT_TRACK_INT64: u8 = 6;

/// Track sample, `u32` in the low 32 bits of the data word
pub const EVENT_TRACK_UINT: u8 = 7;

/// Track sample, `u64` in the data word
pub const EVENT_TRACK_UINT64: u8 = 8;

/// Track sample, `f32` bit pattern in the low 32 bits of the data word
pub const EVENT_TRACK_FLOAT: u8 = 9;

/// Track sample, `f64` bit pattern in the data word
pub const EVENT_TRACK_DOUBLE: u8 = 10;

/// **String fragment**: text in the name field, string id in the data word
///
/// Text longer than [`MAX_ENCODED_NAME_LEN`] is sent as several fragments
/// with the same id.
pub const EVENT_STRING: u8 = 11;

// ============================================================================
// Encoded Event
// ============================================================================

/// Legacy event as it travels from the instrumented process
///
/// **Memory Layout**: `#[repr(C)]` so producers can write it as raw words
/// **Size**: 48 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodedEvent {
    /// Raw argument words, see the module documentation for the layout
    pub args: [u64; ENCODED_EVENT_WORDS],
}

impl EncodedEvent {
    /// Encode an event
    ///
    /// `name` is truncated to [`MAX_ENCODED_NAME_LEN`] bytes on a UTF-8
    /// character boundary. Events without a name (stops) pass `None`.
    #[must_use]
    pub fn new(event_type: u8, name: Option<&str>, data: u64, color: u32) -> Self {
        let mut args = [0u64; ENCODED_EVENT_WORDS];
        args[0] = u64::from(LEGACY_FORMAT_VERSION)
            | (u64::from(event_type) << 8)
            | (u64::from(color) << 32);
        args[1] = data;

        if let Some(name) = name {
            let mut len = name.len().min(MAX_ENCODED_NAME_LEN);
            while !name.is_char_boundary(len) {
                len -= 1;
            }
            let mut bytes = [0u8; MAX_ENCODED_NAME_LEN];
            bytes[..len].copy_from_slice(&name.as_bytes()[..len]);
            for (i, chunk) in bytes.chunks_exact(8).enumerate() {
                let mut word = [0u8; 8];
                word.copy_from_slice(chunk);
                args[NAME_FIRST_WORD + i] = u64::from_le_bytes(word);
            }
        }

        Self { args }
    }

    /// Encode a track sample of any supported numeric kind
    #[must_use]
    pub fn track<T: TrackBits>(name: &str, value: T, color: u32) -> Self {
        Self::new(T::EVENT_TYPE, Some(name), value.to_data_word(), color)
    }

    /// Wrap six raw words received from the transport
    #[must_use]
    pub const fn from_args(args: [u64; ENCODED_EVENT_WORDS]) -> Self {
        Self { args }
    }

    /// Format version byte
    #[must_use]
    pub const fn version(&self) -> u8 {
        (self.args[0] & 0xff) as u8
    }

    /// Event type tag (see the `EVENT_*` constants)
    #[must_use]
    pub const fn event_type(&self) -> u8 {
        ((self.args[0] >> 8) & 0xff) as u8
    }

    /// Opaque color requested by the producer
    #[must_use]
    pub const fn color(&self) -> u32 {
        (self.args[0] >> 32) as u32
    }

    /// Data word
    #[must_use]
    pub const fn data(&self) -> u64 {
        self.args[1]
    }

    /// Raw name field including NUL padding
    #[must_use]
    pub fn name_field(&self) -> [u8; MAX_ENCODED_NAME_LEN] {
        let mut bytes = [0u8; MAX_ENCODED_NAME_LEN];
        for (i, chunk) in bytes.chunks_exact_mut(8).enumerate() {
            chunk.copy_from_slice(&self.args[NAME_FIRST_WORD + i].to_le_bytes());
        }
        bytes
    }

    /// Length of the name in bytes (up to the first NUL)
    #[must_use]
    pub fn name_len(&self) -> usize {
        let bytes = self.name_field();
        bytes.iter().position(|&b| b == 0).unwrap_or(MAX_ENCODED_NAME_LEN)
    }
}

// ============================================================================
// Track Value Bit Packing
// ============================================================================

/// Numeric kinds a legacy track event can carry
///
/// Each kind knows its event type tag and how its bit pattern is stored in the
/// data word. 32-bit kinds occupy the low half; the high half stays zero.
pub trait TrackBits: Copy {
    /// Event type tag for this kind
    const EVENT_TYPE: u8;

    /// Bit pattern of `self` as stored in the data word
    fn to_data_word(self) -> u64;
}

impl TrackBits for i32 {
    const EVENT_TYPE: u8 = EVENT_TRACK_INT;

    fn to_data_word(self) -> u64 {
        u64::from(u32::from_ne_bytes(self.to_ne_bytes()))
    }
}

impl TrackBits for i64 {
    const EVENT_TYPE: u8 = EVENT_TRACK_INT64;

    fn to_data_word(self) -> u64 {
        u64::from_ne_bytes(self.to_ne_bytes())
    }
}

impl TrackBits for u32 {
    const EVENT_TYPE: u8 = EVENT_TRACK_UINT;

    fn to_data_word(self) -> u64 {
        u64::from(self)
    }
}

impl TrackBits for u64 {
    const EVENT_TYPE: u8 = EVENT_TRACK_UINT64;

    fn to_data_word(self) -> u64 {
        self
    }
}

impl TrackBits for f32 {
    const EVENT_TYPE: u8 = EVENT_TRACK_FLOAT;

    fn to_data_word(self) -> u64 {
        u64::from(self.to_bits())
    }
}

impl TrackBits for f64 {
    const EVENT_TYPE: u8 = EVENT_TRACK_DOUBLE;

    fn to_data_word(self) -> u64 {
        self.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields_round_trip() {
        let event = EncodedEvent::new(EVENT_SCOPE_START_ASYNC, Some("load"), 0xFF00_0000_001D, 0xAABB_CCDD);
        assert_eq!(event.version(), LEGACY_FORMAT_VERSION);
        assert_eq!(event.event_type(), EVENT_SCOPE_START_ASYNC);
        assert_eq!(event.color(), 0xAABB_CCDD);
        assert_eq!(event.data(), 0xFF00_0000_001D);
        assert_eq!(&event.name_field()[..event.name_len()], b"load");
    }

    #[test]
    fn test_stop_without_name_has_empty_name_field() {
        let event = EncodedEvent::new(EVENT_SCOPE_STOP, None, 0, 0);
        assert_eq!(event.name_len(), 0);
        assert_eq!(event.args[2..], [0, 0, 0, 0]);
    }

    #[test]
    fn test_long_name_truncated_on_char_boundary() {
        // 31 ASCII bytes followed by a 2-byte character would straddle the limit
        let name = format!("{}é", "a".repeat(31));
        let event = EncodedEvent::new(EVENT_STRING, Some(&name), 1, 0);
        assert_eq!(event.name_len(), 31);

        let exact = "b".repeat(MAX_ENCODED_NAME_LEN);
        let event = EncodedEvent::new(EVENT_STRING, Some(&exact), 1, 0);
        assert_eq!(event.name_len(), MAX_ENCODED_NAME_LEN);
    }

    #[test]
    fn test_track_bits_layout() {
        assert_eq!((-1i32).to_data_word(), 0xFFFF_FFFF);
        assert_eq!((-1i64).to_data_word(), u64::MAX);
        assert_eq!(u32::MAX.to_data_word(), 0xFFFF_FFFF);
        assert_eq!(1.5f32.to_data_word(), u64::from(1.5f32.to_bits()));
        assert_eq!(EncodedEvent::track("x", 2.5f64, 0).data(), 2.5f64.to_bits());
        assert_eq!(EncodedEvent::track("x", 7u64, 0).event_type(), EVENT_TRACK_UINT64);
    }
}
