use serde::{Deserialize, Serialize};

use crate::analysis::InstrumentedFunction;

/// Settings fixed for the lifetime of one capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    /// Functions instrumented before the capture; their ids become scope ids
    pub instrumented_functions: Vec<InstrumentedFunction>,
    /// Keep raw durations per scope for percentile queries
    pub record_durations: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self { instrumented_functions: Vec::new(), record_durations: true }
    }
}
