//! # Event Model
//!
//! Typed representations of the events the capture core consumes. Every
//! event carries the timestamp and the `(process, thread)` that produced it.
//!
//! ## Event Kinds
//!
//! - [`ScopeStart`] / [`ScopeStop`] → nested synchronous scopes, paired per thread
//! - [`AsyncScopeStart`] / [`AsyncScopeStop`] → scopes paired globally by a 64-bit id
//! - [`StringEvent`] → text attached to an id, forwarded unchanged
//! - [`TrackEvent`] → one numeric sample of a named series
//!
//! The legacy six-word encoding from `scopes-common` is demultiplexed into the
//! same kinds by [`legacy::decode_legacy_event`].

#![allow(clippy::cast_precision_loss)]

pub mod legacy;

use serde::{Deserialize, Serialize};

pub use legacy::{decode_legacy_event, LegacyEvent};

/// Opens a synchronous scope on `(process_id, thread_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeStart {
    pub timestamp_ns: u64,
    pub process_id: i32,
    pub thread_id: i32,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub group_id: u64,
    #[serde(default)]
    pub address_in_function: u64,
    /// Id of the instrumented function this scope times, 0 for none
    #[serde(default)]
    pub function_id: u64,
}

/// Closes the innermost open scope on `(process_id, thread_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeStop {
    pub timestamp_ns: u64,
    pub process_id: i32,
    pub thread_id: i32,
}

/// Opens an asynchronous scope identified by `id`
///
/// All 64 bits of `id` are significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncScopeStart {
    pub timestamp_ns: u64,
    pub process_id: i32,
    pub thread_id: i32,
    pub name: String,
    pub id: u64,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub address_in_function: u64,
}

/// Closes the asynchronous scope identified by `id`, from any thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncScopeStop {
    pub timestamp_ns: u64,
    pub process_id: i32,
    pub thread_id: i32,
    pub id: u64,
}

/// Text associated with an id
///
/// `should_concatenate` is only set for legacy events, whose text arrives in
/// fixed-size fragments the consumer has to join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringEvent {
    pub timestamp_ns: u64,
    pub process_id: i32,
    pub thread_id: i32,
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub should_concatenate: bool,
}

/// Numeric payload of a track sample, in the width the producer used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackData {
    Int(i32),
    Int64(i64),
    Uint(u32),
    Uint64(u64),
    Float(f32),
    Double(f64),
}

impl TrackData {
    /// Normalize to `f64`
    ///
    /// 64-bit integers beyond 2^53 round to the nearest representable value.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        match self {
            TrackData::Int(v) => f64::from(v),
            TrackData::Int64(v) => v as f64,
            TrackData::Uint(v) => f64::from(v),
            TrackData::Uint64(v) => v as f64,
            TrackData::Float(v) => f64::from(v),
            TrackData::Double(v) => v,
        }
    }
}

/// One sample of the series `name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEvent {
    pub timestamp_ns: u64,
    pub process_id: i32,
    pub thread_id: i32,
    pub name: String,
    pub data: TrackData,
}

/// Any event the reconstructor accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawEvent {
    ScopeStart(ScopeStart),
    ScopeStop(ScopeStop),
    AsyncScopeStart(AsyncScopeStart),
    AsyncScopeStop(AsyncScopeStop),
    StringEvent(StringEvent),
    TrackValue(TrackEvent),
}
