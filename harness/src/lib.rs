//! Core pieces of a generated test-run harness: deciding which of the
//! compiled-in test cases actually execute for a given argument vector, and
//! running the selected ones sequentially with success/error accounting.
//!
//! Crash diagnostics for tests that take the whole process down live in the
//! `crash-report` crate; the two compose only through the entry point that
//! installs the reporter before running tests.

mod runner;
mod selection;

pub use runner::{Harness, HarnessOptions, RunSummary, TestCase, TestStatus};
pub use selection::{should_run, SelectionMode};
