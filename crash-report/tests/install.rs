use crash_report::{CrashReporter, Error, Signal};

#[test]
fn install_is_exclusive_and_detach_releases() {
    let reporter = CrashReporter::install().expect("first install should succeed");

    // Dispositions are process-wide; a second reporter must be refused.
    match CrashReporter::install() {
        Err(Error::AlreadyInstalled) => {}
        other => panic!("expected AlreadyInstalled, got {:?}", other.map(|_| ())),
    }

    reporter.detach();

    // Once detached the slot is free again.
    let reporter = CrashReporter::install().expect("reinstall after detach should succeed");
    drop(reporter);

    let reporter = CrashReporter::install().expect("reinstall after drop should succeed");
    reporter.detach();
}

#[test]
fn signal_metadata_matches_the_platform() {
    assert_eq!(Signal::Segv.number(), libc::SIGSEGV);
    assert_eq!(Signal::Illegal.number(), libc::SIGILL);
    assert_eq!(Signal::Bus.number(), libc::SIGBUS);
    assert_eq!(Signal::Fpe.number(), libc::SIGFPE);
    assert_eq!(Signal::Fpe.description(), "arithmetic exception");
}
