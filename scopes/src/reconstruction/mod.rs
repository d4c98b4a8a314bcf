//! Scope reconstruction: pairing starts with stops

pub mod scope_reconstructor;
pub mod timer;

pub use scope_reconstructor::{DiscardStats, ScopeReconstructor};
pub use timer::{ApiStringEvent, ApiTrackValue, Timer, TimerKind};
