mod shared;

use shared::run_harness;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn include_runs_only_the_selected_test() {
    let output = run_harness(&["include", "checked-add"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Run 1. 1 success, 0 errors."));
}

#[test]
fn exclude_skips_the_selected_tests() {
    let output = run_harness(&["exclude", "segv", "illegal", "bus", "fpe", "always-fails"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("checked-add: ok"), "stdout:\n{out}");
    assert!(out.contains("Run 1. 1 success, 0 errors."), "stdout:\n{out}");
}

#[test]
fn error_counts_do_not_affect_the_exit_code() {
    let output = run_harness(&["include", "always-fails"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("always-fails: ERROR"), "stdout:\n{out}");
    assert!(out.contains("Run 1. 0 success, 1 errors."), "stdout:\n{out}");
}

#[test]
fn unrecognized_mode_warns_and_excludes() {
    let output = run_harness(&["maybe", "segv", "illegal", "bus", "fpe", "always-fails"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Run 1. 1 success, 0 errors."));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("include/exclude not recognized. Assuming 'exclude'"),
        "stderr:\n{stderr}"
    );
}

#[test]
fn selector_extending_past_the_test_name_still_matches() {
    let output = run_harness(&["include", "checked-add-with-a-suffix"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Run 1. 1 success, 0 errors."));
}

#[test]
fn verbose_flag_is_consumed_before_selection() {
    let output = run_harness(&["-v", "include", "checked-add"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Run 1. 1 success, 0 errors."));

    // Debug diagnostics were enabled: the skipped tests are accounted for
    // on stderr.
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skipped by selection"), "stderr:\n{stderr}");
}

#[test]
fn run_begins_and_ends_with_timestamps() {
    let output = run_harness(&["include", "checked-add"]);
    let out = stdout(&output);
    assert!(out.contains("Begin test run "), "stdout:\n{out}");
    assert!(out.contains("End test run "), "stdout:\n{out}");
}
