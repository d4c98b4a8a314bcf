//! Aggregation of completed timers
//!
//! Pure bookkeeping over timers that already carry their scope id; nothing in
//! here sees raw events.

pub mod aggregator;
pub mod scope_id;
pub mod scope_stats;

pub use aggregator::ScopeStatsAggregator;
pub use scope_id::{InstrumentedFunction, NameEqualityScopeIdProvider, ScopeInfo, ScopeType};
pub use scope_stats::ScopeStats;
