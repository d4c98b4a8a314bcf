//! Command-line surface of the `scopes` replay binary

pub mod args;
pub mod replay;

pub use args::Args;
pub use replay::{print_report, replay, scope_report, ReplayRecord, ReplayStats, ScopeReportRow};
