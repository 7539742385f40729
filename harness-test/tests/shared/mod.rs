use std::process::{Command, Output};

/// Spawns the harness binary with the given argument vector and waits for it.
pub fn run_harness(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_harness-test"))
        .args(args)
        .output()
        .expect("failed to spawn harness-test")
}

/// Runs the harness with only the named crash test included and asserts the
/// full crash-report contract: abnormal termination via abort, exactly one
/// report for `signum`, a bounded frame listing, and stdout progress intact.
#[allow(dead_code)]
pub fn expect_crash(selector: &str, signum: i32) {
    use std::os::unix::process::ExitStatusExt;

    let output = run_harness(&["include", selector]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    // Ensure it was interrupted and did not exit properly.
    assert!(
        output.status.code().is_none(),
        "expected abnormal termination, got {:?}\nstderr:\n{stderr}",
        output.status
    );
    assert_eq!(
        output.status.signal(),
        Some(libc::SIGABRT),
        "the handler should end in abort()\nstderr:\n{stderr}"
    );

    // Exactly one report per crash: the handler restored the default
    // disposition before doing anything else, so it can never re-enter.
    let header = format!("Critical error: received signal {signum}");
    assert_eq!(
        stderr.matches(&header).count(),
        1,
        "expected exactly one crash report\nstderr:\n{stderr}"
    );
    assert!(
        stderr.contains("max. depth 100"),
        "missing depth note\nstderr:\n{stderr}"
    );

    // At least the innermost frame came out, address first.
    assert!(
        stderr.lines().any(|line| line.trim_start().starts_with("0: 0x")),
        "missing frame listing\nstderr:\n{stderr}"
    );

    // Progress written before the fault was flushed, not truncated.
    assert!(
        stdout.contains("Begin test run"),
        "stdout progress lost\nstdout:\n{stdout}"
    );
}
