//! [`CrashReporter`] emits a diagnostic report when a test run is killed by
//! a fatal signal, then lets the process die.
//!
//! The reporter is installed once at harness startup for the following
//! signals:
//!
//! ## `SIGSEGV`
//!
//! Raised on an invalid virtual memory reference: `null` pointer access,
//! out of bounds access, use after free, stack overflows, etc.
//!
//! ## `SIGILL`
//!
//! Raised when the process attempts to execute an illegal, malformed,
//! unknown, or privileged instruction.
//!
//! ## `SIGBUS`
//!
//! Raised on a bus error, eg. access to a memory mapping with no backing
//! storage.
//!
//! ## `SIGFPE`
//!
//! Raised on an erroneous arithmetic operation. Despite the name this
//! covers integer operations as well, notably division by zero.
//!
//! When one of these is delivered the handler restores the default
//! disposition for that signal so it can never re-enter itself, flushes
//! stdio, writes a header naming the signal followed by a backtrace bounded
//! at [`MAX_FRAMES`] frames (innermost first) to stderr, and aborts. There
//! is no recovery path: the triggering state is unrecoverable and the sole
//! goal is a useful report before termination.
//!
//! The handler runs in signal context and is restricted to stream writes,
//! stack capture, and symbol resolution; it takes no locks and performs no
//! heap allocation of its own.

#![allow(unsafe_code)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(feature = "debug-print")]
#[macro_export]
macro_rules! debug_print {
    ($s:literal) => {
        $crate::write_stderr(concat!($s, "\n"));
    };
}

#[cfg(not(feature = "debug-print"))]
#[macro_export]
macro_rules! debug_print {
    ($s:literal) => {};
}

/// Writes the specified string directly to stderr.
///
/// This is safe to be called from within a compromised context.
#[inline]
pub fn write_stderr(s: &str) {
    unsafe {
        libc::write(2, s.as_ptr().cast(), s.len());
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod error;
        mod report;
        mod state;

        pub use error::Error;
        pub use report::MAX_FRAMES;
    } else {
        compile_error!("crash-report only supports unix targets");
    }
}

/// The signals the reporter intercepts.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(i32)]
pub enum Signal {
    Segv = libc::SIGSEGV,
    Illegal = libc::SIGILL,
    Bus = libc::SIGBUS,
    Fpe = libc::SIGFPE,
}

impl Signal {
    /// The raw signal number.
    #[inline]
    pub fn number(self) -> i32 {
        self as i32
    }

    /// Human-readable description, in the vein of `strsignal`.
    #[inline]
    pub fn description(self) -> &'static str {
        report::describe(self as i32)
    }
}

/// Owns the process-wide crash dispositions for the four tracked signals.
///
/// Installing saves the previously registered `sigaction` for each signal;
/// dropping (or [`detach`](Self::detach)) puts them back. Only one reporter
/// can be live at a time since signal dispositions are process state.
pub struct CrashReporter;

impl CrashReporter {
    /// Installs the crash reporter for all tracked signals.
    ///
    /// Failure to install any single signal's handler is reported as a
    /// warning and leaves that signal with its previous disposition; the
    /// reporter still attaches with reduced coverage.
    pub fn install() -> Result<Self, Error> {
        state::attach()?;
        Ok(Self)
    }

    /// Detaches the reporter, restoring the previously installed or default
    /// dispositions.
    ///
    /// This is done automatically when this [`CrashReporter`] is dropped.
    #[inline]
    pub fn detach(self) {
        state::detach();
    }
}

impl Drop for CrashReporter {
    fn drop(&mut self) {
        state::detach();
    }
}
