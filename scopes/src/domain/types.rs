//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers prevent common bugs like passing an async scope id
//! where a scope id is expected, and make function signatures more expressive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process ID
///
/// Process ids arrive signed from the instrumentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub i32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

impl From<i32> for Pid {
    fn from(pid: i32) -> Self {
        Pid(pid)
    }
}

/// Thread ID
///
/// Process-relative thread id as reported by the instrumented process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tid(pub i32);

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TID:{}", self.0)
    }
}

impl From<i32> for Tid {
    fn from(tid: i32) -> Self {
        Tid(tid)
    }
}

/// Scope identifier
///
/// Stable key used to aggregate statistics across all instances of one
/// instrumented call site. Distinct from the async scope id, which only pairs
/// one start with one stop. `0` is reserved for "no scope".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ScopeId(pub u64);

impl ScopeId {
    /// Reserved "no scope" value, never aggregated
    pub const NONE: ScopeId = ScopeId(0);

    /// Returns true if this id may be aggregated
    #[must_use]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope#{}", self.0)
    }
}

/// Duration in nanoseconds
///
/// Represents a time duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(pub u64);

#[allow(clippy::cast_precision_loss)]
impl Duration {
    /// Convert to microseconds (f64)
    #[must_use]
    pub fn as_micros(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Convert to milliseconds (f64)
    #[must_use]
    pub fn as_millis(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Convert to seconds (f64)
    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 1_000 {
            write!(f, "{}ns", self.0)
        } else if self.0 < 1_000_000 {
            write!(f, "{:.2}us", self.as_micros())
        } else if self.0 < 1_000_000_000 {
            write!(f, "{:.2}ms", self.as_millis())
        } else {
            write!(f, "{:.2}s", self.as_seconds())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_tid_display() {
        assert_eq!(Pid::from(42).to_string(), "PID:42");
        assert_eq!(Tid::from(-1).to_string(), "TID:-1");
    }

    #[test]
    fn test_scope_id_validity() {
        assert!(!ScopeId::NONE.is_valid());
        assert!(ScopeId(1).is_valid());
        assert_eq!(ScopeId(7).to_string(), "Scope#7");
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(Duration(850).to_string(), "850ns");
        assert_eq!(Duration(1_500).to_string(), "1.50us");
        assert_eq!(Duration(5_000_000).to_string(), "5.00ms");
        assert_eq!(Duration(1_500_000_000).to_string(), "1.50s");
    }
}
