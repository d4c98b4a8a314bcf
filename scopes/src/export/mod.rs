//! Trace export functionality
//!
//! Currently supports Chrome Trace Event Format for visualization in
//! chrome://tracing or Perfetto.

pub mod chrome_trace;

pub use chrome_trace::ChromeTraceListener;
