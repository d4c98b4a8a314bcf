//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "scopes",
    about = "Replay a recorded event stream and report per-scope timing statistics",
    after_help = "\
EXAMPLES:
    scopes capture.ndjson                          Print scope statistics
    scopes capture.ndjson --export trace.json      Also write a Chrome trace
    scopes capture.ndjson --options options.json   Seed instrumented functions"
)]
pub struct Args {
    /// Newline-delimited JSON events to replay
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Export timers to a Chrome Trace Event Format file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Capture options as JSON (instrumented functions, duration recording)
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Fail on the first malformed input line instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Suppress the statistics table
    #[arg(short, long)]
    pub quiet: bool,
}
