use std::io::{self, Write};

use tracing::debug;

use crate::selection::{eq_ignore_case_up_to, should_run};

/// Options consumed from the argument vector before any test runs.
#[derive(Clone, Debug, Default)]
pub struct HarnessOptions {
    /// Verbose diagnostic logging was requested (`-v` as the first argument).
    pub verbose: bool,
    /// The selection: mode token followed by zero or more selector tokens.
    pub selection: Vec<String>,
}

impl HarnessOptions {
    /// Parses the process's own arguments (without the program name).
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1).collect())
    }

    /// A leading argument counts as the verbosity flag when its first two
    /// bytes match `-v` case-insensitively, so `-V` and `-verbose` work too.
    /// Everything after it is the selection, held immutably for the run.
    pub fn parse(mut args: Vec<String>) -> Self {
        let verbose = args
            .first()
            .is_some_and(|arg| eq_ignore_case_up_to("-v", arg, 2));
        if verbose {
            args.remove(0);
        }

        Self {
            verbose,
            selection: args,
        }
    }
}

/// One compiled-in test case.
pub struct TestCase {
    /// The declared name, matched against selector tokens.
    pub name: &'static str,
    /// The injected body.
    pub run: fn() -> TestStatus,
}

/// What a test body reports back.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TestStatus {
    Success,
    Error,
}

/// Counters for one run. Informational only: the harness exits 0 whether or
/// not errors were recorded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub run: u32,
    pub success: u32,
    pub errors: u32,
}

/// Runs a fixed list of test cases sequentially on the calling thread,
/// gating each through the selection filter.
pub struct Harness {
    options: HarnessOptions,
}

impl Harness {
    #[inline]
    pub fn new(options: HarnessOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn from_env() -> Self {
        Self::new(HarnessOptions::from_env())
    }

    #[inline]
    pub fn options(&self) -> &HarnessOptions {
        &self.options
    }

    /// Executes every selected test and prints progress and the final
    /// `Run N. S success, E errors.` summary to stdout.
    ///
    /// Stdout is flushed after each line so that a test crashing the
    /// process cannot truncate progress that was already reported.
    pub fn run(&self, tests: &[TestCase]) -> RunSummary {
        let mut out = io::stdout();
        let mut summary = RunSummary::default();

        let _ = writeln!(out, "Begin test run {}", timestamp());
        let _ = out.flush();

        for test in tests {
            if !should_run(test.name, &self.options.selection) {
                debug!(test = test.name, "skipped by selection");
                continue;
            }

            summary.run += 1;
            match (test.run)() {
                TestStatus::Success => {
                    summary.success += 1;
                    let _ = writeln!(out, "{}: ok", test.name);
                }
                TestStatus::Error => {
                    summary.errors += 1;
                    let _ = writeln!(out, "{}: ERROR", test.name);
                }
            }
            let _ = out.flush();
        }

        let _ = writeln!(out, "End test run {}", timestamp());
        let _ = writeln!(
            out,
            "Run {}. {} success, {} errors.",
            summary.run, summary.success, summary.errors
        );
        let _ = out.flush();

        summary
    }
}

fn timestamp() -> impl std::fmt::Display {
    chrono::Local::now().format("%a %b %e %H:%M:%S %Y")
}
