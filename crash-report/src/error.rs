use std::fmt;

/// An error that can occur when installing or detaching a [`crate::CrashReporter`]
#[derive(Debug)]
pub enum Error {
    /// Unable to `mmap` memory for the alternate signal stack
    OutOfMemory,
    /// Signal dispositions are process-wide, so only one
    /// [`crate::CrashReporter`] can be installed at any one time.
    AlreadyInstalled,
    /// An I/O or other syscall failed
    Io(std::io::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => f.write_str("unable to allocate memory"),
            Self::AlreadyInstalled => f.write_str("a crash reporter is already installed"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
