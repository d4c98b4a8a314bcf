//! # Listener Sinks
//!
//! The reconstructor publishes completed timers, string events and track
//! values to a [`CaptureListener`]. Calls are synchronous and happen inside the
//! `process_*` call that produced them, so a listener must not call back into
//! the same reconstructor.
//!
//! ## Provided Listeners
//!
//! - [`RecordingListener`]: keeps everything in memory (tests, replay)
//! - [`ChannelListener`]: forwards to a consumer thread without blocking
//! - [`ChromeTraceListener`](crate::export::ChromeTraceListener): writes
//!   Chrome Trace Event Format JSON

pub mod channel;
pub mod recording;

pub use channel::{CaptureMessage, ChannelListener};
pub use recording::RecordingListener;

use crate::reconstruction::{ApiStringEvent, ApiTrackValue, Timer};

/// Consumer of everything the capture core emits
pub trait CaptureListener {
    fn on_timer(&mut self, timer: Timer);

    fn on_api_string_event(&mut self, string_event: ApiStringEvent);

    fn on_api_track_value(&mut self, track_value: ApiTrackValue);
}

impl<L: CaptureListener + ?Sized> CaptureListener for &mut L {
    fn on_timer(&mut self, timer: Timer) {
        (**self).on_timer(timer);
    }

    fn on_api_string_event(&mut self, string_event: ApiStringEvent) {
        (**self).on_api_string_event(string_event);
    }

    fn on_api_track_value(&mut self, track_value: ApiTrackValue) {
        (**self).on_api_track_value(track_value);
    }
}

impl<L: CaptureListener + ?Sized> CaptureListener for Box<L> {
    fn on_timer(&mut self, timer: Timer) {
        (**self).on_timer(timer);
    }

    fn on_api_string_event(&mut self, string_event: ApiStringEvent) {
        (**self).on_api_string_event(string_event);
    }

    fn on_api_track_value(&mut self, track_value: ApiTrackValue) {
        (**self).on_api_track_value(track_value);
    }
}

/// `None` drops every emission
impl<L: CaptureListener> CaptureListener for Option<L> {
    fn on_timer(&mut self, timer: Timer) {
        if let Some(listener) = self {
            listener.on_timer(timer);
        }
    }

    fn on_api_string_event(&mut self, string_event: ApiStringEvent) {
        if let Some(listener) = self {
            listener.on_api_string_event(string_event);
        }
    }

    fn on_api_track_value(&mut self, track_value: ApiTrackValue) {
        if let Some(listener) = self {
            listener.on_api_track_value(track_value);
        }
    }
}
