//! # Replay
//!
//! Feeds a recorded event stream through a [`CaptureSession`] and builds the
//! per-scope report printed by the `scopes` binary.
//!
//! ## Input Format
//!
//! One JSON object per line, selected by its `kind` field:
//!
//! - `scope_start`, `scope_stop`, `async_scope_start`, `async_scope_stop`,
//!   `string_event`, `track_value` → [`RawEvent`]
//! - `legacy` → [`LegacyEvent`] (six raw words in `args`)
//! - `thread_state` → [`ThreadStateSlice`]
//!
//! Blank lines are ignored.

#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use anyhow::{bail, Context, Result};
use log::warn;
use serde_json::Value as JsonValue;
use std::io::BufRead;

use crate::analysis::{ScopeStats, ScopeType};
use crate::capture::{CaptureData, CaptureSession};
use crate::domain::{Duration, ScopeId};
use crate::events::{LegacyEvent, RawEvent};
use crate::listener::CaptureListener;
use crate::thread_state::ThreadStateSlice;

/// One line of replay input
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayRecord {
    Event(RawEvent),
    Legacy(LegacyEvent),
    ThreadState(ThreadStateSlice),
}

impl ReplayRecord {
    /// Parse one input line
    ///
    /// # Errors
    /// Returns an error if the line is not JSON or does not match its `kind`.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        let value: JsonValue = serde_json::from_str(line)?;
        let kind = value.get("kind").and_then(JsonValue::as_str).map(str::to_owned);
        match kind.as_deref() {
            Some("legacy") => serde_json::from_value(value).map(ReplayRecord::Legacy),
            Some("thread_state") => serde_json::from_value(value).map(ReplayRecord::ThreadState),
            _ => serde_json::from_value(value).map(ReplayRecord::Event),
        }
    }

    pub fn apply<L: CaptureListener>(self, session: &mut CaptureSession<L>) {
        match self {
            ReplayRecord::Event(event) => session.process_event(event),
            ReplayRecord::Legacy(event) => session.process_legacy_event(&event),
            ReplayRecord::ThreadState(slice) => session.add_thread_state_slice(slice),
        }
    }
}

/// Line counts of one replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub records: usize,
    pub skipped: usize,
}

/// Replay every line of `reader` into `session`
///
/// Malformed lines are skipped with a warning, or abort the replay when
/// `strict` is set.
///
/// # Errors
/// Returns an error if reading fails, or on a malformed line in strict mode.
pub fn replay<R: BufRead, L: CaptureListener>(
    reader: R,
    session: &mut CaptureSession<L>,
    strict: bool,
) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("Failed to read input line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }

        match ReplayRecord::parse(&line) {
            Ok(record) => {
                record.apply(session);
                stats.records += 1;
            }
            Err(e) if strict => bail!("Malformed record on line {line_number}: {e}"),
            Err(e) => {
                warn!("Skipping malformed record on line {line_number}: {e}");
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}

// =============================================================================
// REPORT
// =============================================================================

/// Statistics of one scope, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeReportRow {
    pub scope_id: ScopeId,
    pub name: String,
    pub scope_type: Option<ScopeType>,
    pub stats: ScopeStats,
    /// Lower median; `None` when durations were not recorded
    pub median_ns: Option<u64>,
}

/// One row per aggregated scope, largest total time first
#[must_use]
pub fn scope_report(data: &CaptureData) -> Vec<ScopeReportRow> {
    let mut rows: Vec<ScopeReportRow> = data
        .all_scope_ids()
        .into_iter()
        .map(|scope_id| {
            let info = data.scope_info(scope_id);
            let median_ns = data.median_timer_duration(scope_id);
            ScopeReportRow {
                scope_id,
                name: info.as_ref().map_or_else(|| scope_id.to_string(), |i| i.name.clone()),
                scope_type: info.map(|i| i.scope_type),
                stats: data.scope_stats_or_default(scope_id),
                median_ns,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.stats.total_time_ns.cmp(&a.stats.total_time_ns).then(a.scope_id.cmp(&b.scope_id))
    });
    rows
}

fn type_label(scope_type: Option<ScopeType>) -> &'static str {
    match scope_type {
        Some(ScopeType::ApiScope) => "sync",
        Some(ScopeType::ApiScopeAsync) => "async",
        Some(ScopeType::InstrumentedFunction) => "function",
        None => "?",
    }
}

/// Print the report as a table on stdout
pub fn print_report(rows: &[ScopeReportRow]) {
    println!(
        "{:<32} {:>6} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "SCOPE", "TYPE", "COUNT", "MEAN", "STD DEV", "MIN", "MEDIAN", "MAX"
    );
    for row in rows {
        let median = row.median_ns.map_or_else(|| "-".to_string(), |m| Duration(m).to_string());
        println!(
            "{:<32} {:>6} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
            row.name,
            type_label(row.scope_type),
            row.stats.count,
            Duration(row.stats.mean_ns().round() as u64).to_string(),
            Duration(row.stats.std_dev_ns().round() as u64).to_string(),
            Duration(row.stats.min_ns).to_string(),
            median,
            Duration(row.stats.max_ns).to_string(),
        );
    }
}
