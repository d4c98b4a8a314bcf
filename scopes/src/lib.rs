//! # scopes - Scope Capture Core
//!
//! Reconstructs timing information from the start/stop events an instrumented
//! process emits, aggregates it per scope and answers "what was this thread
//! doing" queries over scheduler slices.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Instrumented Process                         │
//! │        (typed events or legacy six-word encoded events)         │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ ordered event stream
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      scopes (This Crate)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │    Events    │──▶│    Scope     │──▶│   Capture    │         │
//! │  │ (+ legacy)   │   │Reconstructor │   │   Session    │         │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘         │
//! │                                               │                 │
//! │                        ┌──────────────────────┼────────┐        │
//! │                        ▼                      ▼        ▼        │
//! │                 ┌──────────────┐   ┌──────────────┐ ┌────────┐  │
//! │                 │   Analysis   │   │ Thread State │ │Listener│  │
//! │                 │ (scope stats)│   │    Index     │ │ (host) │  │
//! │                 └──────────────┘   └──────────────┘ └────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`events`]: typed event model and the legacy event demultiplexer
//! - [`reconstruction`]: pairs starts with stops into [`reconstruction::Timer`]s
//!   - synchronous scopes nest per thread
//!   - async scopes match globally by 64-bit id
//! - [`analysis`]: per-scope statistics (Welford variance), sorted durations
//!   and scope id assignment
//! - [`thread_state`]: per-thread interval index with point queries
//! - [`capture`]: one capture's lifecycle and its shared, queryable data
//! - [`listener`]: the consumer trait and in-memory / channel sinks
//! - [`export`]: Chrome Trace Event Format output
//! - [`cli`]: the replay harness behind the `scopes` binary
//! - [`domain`]: newtypes and error types
//!
//! ## Lossy Input
//!
//! Stops without a start and repeated async starts are normal on a best effort
//! transport. They are dropped silently, counted, and never reported as errors.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Replay a recorded stream and print per-scope statistics
//! ./scopes capture.ndjson
//!
//! # Also export the timers for chrome://tracing
//! ./scopes capture.ndjson --export trace.json
//! ```

pub mod analysis;
pub mod capture;
pub mod cli;
pub mod domain;
pub mod events;
pub mod export;
pub mod listener;
pub mod reconstruction;
pub mod thread_state;
