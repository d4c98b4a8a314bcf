//! Capture lifecycle and the data it produces

pub mod capture_data;
pub mod options;
pub mod session;

pub use capture_data::CaptureData;
pub use options::CaptureOptions;
pub use session::{CaptureSession, CaptureSummary};
