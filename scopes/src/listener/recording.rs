use super::CaptureListener;
use crate::reconstruction::{ApiStringEvent, ApiTrackValue, Timer};

/// Listener that keeps every emission in arrival order
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub timers: Vec<Timer>,
    pub string_events: Vec<ApiStringEvent>,
    pub track_values: Vec<ApiTrackValue>,
}

impl RecordingListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of emissions received
    #[must_use]
    pub fn emission_count(&self) -> usize {
        self.timers.len() + self.string_events.len() + self.track_values.len()
    }
}

impl CaptureListener for RecordingListener {
    fn on_timer(&mut self, timer: Timer) {
        self.timers.push(timer);
    }

    fn on_api_string_event(&mut self, string_event: ApiStringEvent) {
        self.string_events.push(string_event);
    }

    fn on_api_track_value(&mut self, track_value: ApiTrackValue) {
        self.track_values.push(track_value);
    }
}
