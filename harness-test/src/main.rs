//! A compiled test run exercising the harness core end to end: two ordinary
//! test cases plus one per tracked fatal signal. The integration suite in
//! `tests/` spawns this binary and asserts on its streams and exit status.

use test_harness::{Harness, HarnessOptions, TestCase, TestStatus};

fn checked_add() -> TestStatus {
    if 2u32.checked_add(2) == Some(4) {
        TestStatus::Success
    } else {
        TestStatus::Error
    }
}

fn always_fails() -> TestStatus {
    TestStatus::Error
}

fn segv() -> TestStatus {
    fault_generator::raise_segfault();
    TestStatus::Error
}

fn illegal() -> TestStatus {
    fault_generator::raise_illegal_instruction();
    TestStatus::Error
}

fn bus() -> TestStatus {
    let path = std::env::temp_dir().join(format!("harness-test-bus-{}.dat", std::process::id()));
    fault_generator::raise_bus(path.to_str().expect("temp path is not utf-8"));
    TestStatus::Error
}

fn fpe() -> TestStatus {
    fault_generator::raise_floating_point_exception();
    TestStatus::Error
}

const TESTS: &[TestCase] = &[
    TestCase {
        name: "checked-add",
        run: checked_add,
    },
    TestCase {
        name: "always-fails",
        run: always_fails,
    },
    TestCase {
        name: "segv",
        run: segv,
    },
    TestCase {
        name: "illegal",
        run: illegal,
    },
    TestCase {
        name: "bus",
        run: bus,
    },
    TestCase {
        name: "fpe",
        run: fpe,
    },
];

fn main() {
    let options = HarnessOptions::from_env();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if options.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let _reporter =
        crash_report::CrashReporter::install().expect("failed to install crash reporter");

    Harness::new(options).run(TESTS);

    // Counters are informational; completing the run is success.
}
