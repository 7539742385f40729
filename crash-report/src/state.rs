use crate::{report, Error, Signal};
use std::{mem, ptr};

/// The signals we install a reporting handler for.
const FATAL_SIGNALS: [Signal; 4] = [Signal::Segv, Signal::Illegal, Signal::Bus, Signal::Fpe];

// std::cmp::max is not const :(
const fn get_stack_size() -> usize {
    // Symbol resolution runs on this stack, so it needs far more headroom
    // than the platform minimum.
    if libc::SIGSTKSZ > 64 * 1024 {
        libc::SIGSTKSZ
    } else {
        64 * 1024
    }
}

/// The size of the alternate stack the handler runs on. Only ever committed
/// if a tracked signal actually fires, so the generous size costs address
/// space, not memory.
const SIG_STACK_SIZE: usize = get_stack_size();

struct StackSave {
    old: Option<libc::stack_t>,
    new: libc::stack_t,
}

unsafe impl Send for StackSave {}

static STACK_SAVE: parking_lot::Mutex<Option<StackSave>> = parking_lot::const_mutex(None);

/// Maps an alternate stack for the signal handler to run on, so a SIGSEGV
/// caused by stack overflow can still be reported.
unsafe fn install_sigaltstack() -> Result<(), Error> {
    unsafe {
        // If an existing sigaltstack is big enough, keep it.
        let mut old_stack = mem::zeroed();
        if libc::sigaltstack(ptr::null(), &mut old_stack) != 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }

        if old_stack.ss_flags & libc::SS_DISABLE == 0 && old_stack.ss_size >= SIG_STACK_SIZE {
            return Ok(());
        }

        let guard_size = libc::sysconf(libc::_SC_PAGESIZE) as usize;
        let alloc_size = guard_size + SIG_STACK_SIZE;

        let ptr = libc::mmap(
            ptr::null_mut(),
            alloc_size,
            libc::PROT_NONE,
            libc::MAP_PRIVATE | libc::MAP_ANON,
            -1,
            0,
        );
        if ptr == libc::MAP_FAILED {
            return Err(Error::OutOfMemory);
        }

        // Leave the first page as an inaccessible guard, make the rest usable.
        let stack_ptr = (ptr as usize + guard_size) as *mut libc::c_void;
        if libc::mprotect(stack_ptr, SIG_STACK_SIZE, libc::PROT_READ | libc::PROT_WRITE) != 0 {
            let err = std::io::Error::last_os_error();
            libc::munmap(ptr, alloc_size);
            return Err(Error::Io(err));
        }

        let new_stack = libc::stack_t {
            ss_sp: stack_ptr,
            ss_flags: 0,
            ss_size: SIG_STACK_SIZE,
        };
        if libc::sigaltstack(&new_stack, ptr::null_mut()) != 0 {
            let err = std::io::Error::last_os_error();
            libc::munmap(ptr, alloc_size);
            return Err(Error::Io(err));
        }

        *STACK_SAVE.lock() = Some(StackSave {
            old: (old_stack.ss_flags & libc::SS_DISABLE != 0).then_some(old_stack),
            new: new_stack,
        });

        Ok(())
    }
}

unsafe fn restore_sigaltstack() {
    let mut ssl = STACK_SAVE.lock();

    // Only unwind our own installation; if someone else swapped the stack
    // since, leave theirs alone.
    if let Some(ss) = &mut *ssl {
        unsafe {
            let mut current_stack = mem::zeroed();
            if libc::sigaltstack(ptr::null(), &mut current_stack) == -1 {
                return;
            }

            if current_stack.ss_sp == ss.new.ss_sp {
                if let Some(old) = ss.old {
                    if libc::sigaltstack(&old, ptr::null_mut()) == -1 {
                        return;
                    }
                } else {
                    let mut disable: libc::stack_t = mem::zeroed();
                    disable.ss_flags = libc::SS_DISABLE;
                    if libc::sigaltstack(&disable, ptr::null_mut()) == -1 {
                        return;
                    }
                }
            }

            let guard_size = libc::sysconf(libc::_SC_PAGESIZE) as usize;
            libc::munmap(
                (ss.new.ss_sp as usize - guard_size) as *mut libc::c_void,
                ss.new.ss_size + guard_size,
            );
            *ssl = None;
        }
    }
}

/// Puts the disposition for `signum` back to the default action as seen in
/// <https://man7.org/linux/man-pages/man7/signal.7.html>
#[inline]
unsafe fn install_default_handler(signum: i32) {
    // Android L+ exposes signal/sigaction symbols that silently ignore a
    // request to set SIG_DFL, which would leave our handler looping on
    // signal re-delivery. Call the system sigaction directly there.
    unsafe {
        cfg_if::cfg_if! {
            if #[cfg(target_os = "android")] {
                let mut sa: libc::sigaction = mem::zeroed();
                libc::sigemptyset(&mut sa.sa_mask);
                sa.sa_sigaction = libc::SIG_DFL;
                sa.sa_flags = libc::SA_RESTART;
                libc::syscall(
                    libc::SYS_rt_sigaction,
                    signum,
                    &sa,
                    ptr::null::<libc::sigaction>(),
                    mem::size_of::<libc::sigset_t>(),
                );
            } else {
                libc::signal(signum, libc::SIG_DFL);
            }
        }
    }
}

/// The dispositions that were active before [`install_handlers`], kept so
/// detaching can put them back. `Some` doubles as the "installed" flag.
static OLD_HANDLERS: parking_lot::Mutex<Option<[libc::sigaction; 4]>> =
    parking_lot::const_mutex(None);

unsafe fn install_handlers() -> Result<(), Error> {
    let mut ohl = OLD_HANDLERS.lock();

    if ohl.is_some() {
        return Err(Error::AlreadyInstalled);
    }

    unsafe {
        // Save the current dispositions first so detach can restore them.
        let mut old_handlers: [libc::sigaction; 4] = mem::zeroed();

        for (sig, old) in FATAL_SIGNALS.iter().zip(old_handlers.iter_mut()) {
            if libc::sigaction(*sig as i32, ptr::null(), old) == -1 {
                return Err(Error::Io(std::io::Error::last_os_error()));
            }
        }

        let mut sa: libc::sigaction = mem::zeroed();
        libc::sigemptyset(&mut sa.sa_mask);

        // Mask the other fatal signals while one of them is being reported.
        for sig in FATAL_SIGNALS {
            libc::sigaddset(&mut sa.sa_mask, sig as i32);
        }

        sa.sa_sigaction = signal_handler as usize;
        sa.sa_flags = libc::SA_ONSTACK | libc::SA_SIGINFO;

        for sig in FATAL_SIGNALS {
            // A signal whose handler cannot be installed keeps its previous
            // disposition; the reporter runs with reduced coverage.
            if libc::sigaction(sig as i32, &sa, ptr::null_mut()) == -1 {
                tracing::warn!(
                    signal = sig.number(),
                    error = %std::io::Error::last_os_error(),
                    "failed to install crash handler"
                );
            }
        }

        *ohl = Some(old_handlers);
    }

    Ok(())
}

/// Restores all of the dispositions back to their previous values, or the
/// default if the previous value cannot be restored.
unsafe fn restore_handlers() {
    let mut ohl = OLD_HANDLERS.lock();

    if let Some(old) = &*ohl {
        unsafe {
            for (sig, action) in FATAL_SIGNALS.into_iter().zip(old.iter()) {
                if libc::sigaction(sig as i32, action, ptr::null_mut()) == -1 {
                    install_default_handler(sig as i32);
                }
            }
        }
    }

    ohl.take();
}

pub(super) fn attach() -> Result<(), Error> {
    // SAFETY: syscalls
    unsafe {
        install_sigaltstack()?;
        install_handlers()
    }
}

pub(super) fn detach() {
    // SAFETY: syscalls
    unsafe {
        restore_handlers();
        restore_sigaltstack();
    }
}

/// The actual function installed for each tracked signal, invoked by the
/// kernel on the alternate stack.
unsafe extern "C" fn signal_handler(
    signum: i32,
    _info: *mut libc::siginfo_t,
    _ctx: *mut libc::c_void,
) {
    unsafe {
        // Back to the default action before anything else: if the reporting
        // path itself faults, or the same signal is delivered again, the
        // process dies instead of looping through this handler.
        install_default_handler(signum);
        debug_print!("restored default disposition");

        // Drain C-level stdio so progress written before the fault is not
        // lost or interleaved with the report.
        libc::fflush(ptr::null_mut());
        debug_print!("flushed stdio");

        report::emit(signum);
        debug_print!("report emitted");

        // The triggering state is unrecoverable; terminate abnormally rather
        // than returning into it.
        libc::abort();
    }
}
