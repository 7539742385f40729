//! Provides one function per fatal signal the harness tracks, each raising
//! that signal through a genuine hardware fault where the architecture
//! allows it. Useful only for exercising crash reporting.

#![allow(unsafe_code)]

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use std::arch::asm;

/// Raises `SIGSEGV` by reading through a null reference.
pub fn raise_segfault() {
    let s: &u32 = unsafe {
        // avoid deref_nullptr lint
        fn definitely_not_null() -> *const u32 {
            std::ptr::null()
        }
        &*definitely_not_null()
    };

    println!("we are crashing by accessing a null reference: {s}");
}

/// Raises `SIGILL` by executing a guaranteed-undefined instruction.
pub fn raise_illegal_instruction() {
    unsafe {
        #[cfg(target_arch = "x86_64")]
        asm!("ud2");

        #[cfg(target_arch = "aarch64")]
        asm!("udf #0");

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        libc::raise(libc::SIGILL);
    }
}

/// Raises `SIGFPE` via an integer division by zero.
///
/// aarch64 integer division does not trap, so there the signal is raised
/// directly instead.
pub fn raise_floating_point_exception() {
    #[cfg(target_arch = "x86_64")]
    {
        let ohno = unsafe {
            let mut divisor: u32;
            asm!(
                "mov eax, 1",
                "cdq",
                "mov {div:e}, 0",
                "idiv {div:e}",
                div = out(reg) divisor
            );
            divisor
        };

        println!("we are crashing by dividing by zero: {ohno}");
    }

    #[cfg(not(target_arch = "x86_64"))]
    unsafe {
        libc::raise(libc::SIGFPE);
    }
}

/// Raises `SIGBUS` by touching a mapped page with no backing storage: the
/// file at `path` is created empty and never grown, so the first byte of
/// the mapping is past the end of the object.
pub fn raise_bus(path: &str) {
    let path = std::ffi::CString::new(path).unwrap();

    unsafe {
        let bus_fd = libc::open(path.as_ptr(), libc::O_RDWR | libc::O_CREAT, 0o666);
        assert!(bus_fd != -1, "failed to create {path:?}");

        let mapping = std::slice::from_raw_parts_mut(
            libc::mmap(
                std::ptr::null_mut(),
                128,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                bus_fd,
                0,
            )
            .cast::<u8>(),
            128,
        );

        println!("{}", mapping[1]);
    }
}
