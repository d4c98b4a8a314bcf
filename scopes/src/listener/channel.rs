//! Forwarding emissions to a consumer thread
//!
//! The reconstructor must never block on its consumer, so emissions are sent
//! with `try_send` on a bounded channel. When the consumer falls behind the
//! message is dropped and counted.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::debug;

use super::CaptureListener;
use crate::reconstruction::{ApiStringEvent, ApiTrackValue, Timer};

/// One emission, as seen by the consumer thread
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureMessage {
    Timer(Timer),
    StringEvent(ApiStringEvent),
    TrackValue(ApiTrackValue),
}

/// Listener that hands emissions to another thread
#[derive(Debug)]
pub struct ChannelListener {
    tx: Sender<CaptureMessage>,
    /// Messages dropped because the channel was full
    pub dropped: u64,
    /// Messages dropped because the receiver is gone
    pub disconnected: u64,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, Receiver<CaptureMessage>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx, dropped: 0, disconnected: 0 }, rx)
    }

    fn forward(&mut self, message: CaptureMessage) {
        match self.tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                debug!("Capture channel full, dropped message ({} so far)", self.dropped);
            }
            Err(TrySendError::Disconnected(_)) => {
                self.disconnected += 1;
            }
        }
    }
}

impl CaptureListener for ChannelListener {
    fn on_timer(&mut self, timer: Timer) {
        self.forward(CaptureMessage::Timer(timer));
    }

    fn on_api_string_event(&mut self, string_event: ApiStringEvent) {
        self.forward(CaptureMessage::StringEvent(string_event));
    }

    fn on_api_track_value(&mut self, track_value: ApiTrackValue) {
        self.forward(CaptureMessage::TrackValue(track_value));
    }
}
