//! # scopes - Main Entry Point
//!
//! Replays a recorded event stream through a capture session, prints the
//! per-scope statistics and optionally exports the timers as a Chrome trace.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use scopes::capture::{CaptureOptions, CaptureSession};
use scopes::cli::{print_report, replay, scope_report, Args};
use scopes::export::ChromeTraceListener;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

/// Arguments that parse but cannot be used together
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct UsageError(String);

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<UsageError>().is_some() {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn load_options(args: &Args) -> Result<CaptureOptions> {
    let Some(ref path) = args.options else {
        return Ok(CaptureOptions::default());
    };
    let file = File::open(path)
        .with_context(|| format!("Failed to open options file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid options file: {}", path.display()))
}

/// Whether both paths name the same file, resolving `.`, `..` and symlinks
/// when both exist
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if args.export.as_deref().is_some_and(|export| is_same_file(export, &args.input)) {
        return Err(UsageError(format!(
            "--export would overwrite the input file {}",
            args.input.display()
        ))
        .into());
    }

    let options = load_options(&args)?;
    let input = File::open(&args.input)
        .with_context(|| format!("Failed to open input: {}", args.input.display()))?;

    let exporter = args.export.as_ref().map(|_| ChromeTraceListener::new());
    let mut session = CaptureSession::new(exporter, options);

    let stats = replay(BufReader::new(input), &mut session, args.strict)?;
    let summary = session.on_capture_complete();
    info!("Replayed {} records ({} skipped)", stats.records, stats.skipped);

    if !args.quiet {
        print_report(&scope_report(&session.capture_data()));
        println!();
        println!(
            "{} events, {} timers, {} scopes, {} discarded, {} malformed lines skipped",
            summary.event_count,
            summary.timer_count,
            summary.scope_count,
            summary.discards.total(),
            stats.skipped
        );
    }

    if let (Some(path), Some(exporter)) = (args.export.as_ref(), session.into_listener()) {
        exporter
            .write_to_file(path)
            .with_context(|| format!("Failed to export trace to {}", path.display()))?;
        if !args.quiet {
            println!("Trace written to {} ({} events)", path.display(), exporter.event_count());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_same_file_through_different_spellings() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("capture.ndjson");
        fs::write(&file, "").unwrap();

        assert!(is_same_file(&file, &dir.path().join(".").join("capture.ndjson")));
        assert!(!is_same_file(&file, &dir.path().join("trace.json")));
        assert!(is_same_file(Path::new("missing.json"), Path::new("missing.json")));
    }
}
