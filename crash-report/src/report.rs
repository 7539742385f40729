//! The report emitted from signal context.
//!
//! Everything here must hold up inside an asynchronous interruption: the
//! only non-trivial calls permitted are `write(2)` on fd 2, frame capture,
//! and symbol resolution. Formatting goes through [`RawStderr`], which
//! pushes straight to the fd without buffering, locking, or allocating.

use std::fmt::{self, Write as _};

/// Upper bound on the number of stack frames captured for one report.
pub const MAX_FRAMES: usize = 100;

/// `fmt::Write` adapter over unbuffered fd-2 writes.
struct RawStderr;

impl fmt::Write for RawStderr {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        crate::write_stderr(s);
        Ok(())
    }
}

/// `strsignal` stand-in for the tracked signals.
pub(crate) fn describe(signum: i32) -> &'static str {
    match signum {
        libc::SIGSEGV => "invalid memory reference",
        libc::SIGILL => "illegal instruction",
        libc::SIGBUS => "bus error",
        libc::SIGFPE => "arithmetic exception",
        _ => "unknown signal",
    }
}

/// Writes the full crash report for `signum` to stderr: header, depth note,
/// then up to [`MAX_FRAMES`] frames innermost-first.
///
/// Returns rather than aborting so the caller controls termination. Never
/// blocks waiting for frames; a capture that produces nothing still leaves
/// a complete header behind.
pub(crate) unsafe fn emit(signum: i32) {
    let mut out = RawStderr;

    let _ = write!(
        out,
        "\n\nCritical error: received signal {signum} ({}). Unexpected exit.\n",
        describe(signum)
    );
    let _ = write!(out, "Trying to get the backtrace (max. depth {MAX_FRAMES})...\n");

    let mut depth = 0usize;
    unsafe {
        backtrace::trace_unsynchronized(|frame| {
            let ip = frame.ip();
            let _ = write!(out, "{depth:4}: {ip:p}");

            let mut named = false;
            backtrace::resolve_unsynchronized(ip, |symbol| {
                // Inlined frames resolve repeatedly for one ip; keep the
                // innermost name only.
                if named {
                    return;
                }
                if let Some(name) = symbol.name() {
                    let _ = write!(out, " - {name}");
                    named = true;
                }
            });

            crate::write_stderr("\n");

            depth += 1;
            depth < MAX_FRAMES
        });
    }

    if depth == 0 {
        crate::write_stderr("(backtrace capture returned no frames)\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_tracked_signals() {
        assert_eq!(describe(libc::SIGSEGV), "invalid memory reference");
        assert_eq!(describe(libc::SIGILL), "illegal instruction");
        assert_eq!(describe(libc::SIGBUS), "bus error");
        assert_eq!(describe(libc::SIGFPE), "arithmetic exception");
        assert_eq!(describe(libc::SIGTERM), "unknown signal");
    }

    #[test]
    fn capture_is_bounded_and_innermost_first() {
        // Capturing outside signal context exercises the same primitives the
        // handler uses.
        let mut frames = 0usize;
        unsafe {
            backtrace::trace_unsynchronized(|_| {
                frames += 1;
                frames < MAX_FRAMES
            });
        }
        assert!(frames > 0);
        assert!(frames <= MAX_FRAMES);
    }
}
