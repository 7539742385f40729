mod shared;

#[test]
fn reports_segv() {
    shared::expect_crash("segv", libc::SIGSEGV);
}
