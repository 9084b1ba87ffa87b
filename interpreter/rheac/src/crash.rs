//! Crash-signal handling.
//!
//! A POSIX `SIGSEGV` handler that prints a short notice and exits. Only
//! async-signal-safe calls are allowed inside the handler, so it writes
//! with raw `libc::write` and leaves through `_exit`.

#[cfg(unix)]
#[allow(
    unsafe_code,
    reason = "signal handler installation requires raw sigaction"
)]
mod imp {
    const MESSAGE: &[u8] =
        b"\x1b[1;31mSegmentation fault detected\x1b[0m: the interpreter or a \
          loaded native library crashed.\n";

    extern "C" fn on_segfault(_signal: libc::c_int) {
        // SAFETY: write(2) and _exit(2) are async-signal-safe.
        unsafe {
            libc::write(
                libc::STDERR_FILENO,
                MESSAGE.as_ptr().cast(),
                MESSAGE.len(),
            );
            libc::_exit(1);
        }
    }

    pub fn install() {
        // SAFETY: a zeroed sigaction with a valid handler address is the
        // documented way to install a signal disposition.
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            let handler: extern "C" fn(libc::c_int) = on_segfault;
            action.sa_sigaction = handler as usize;
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(libc::SIGSEGV, &action, std::ptr::null_mut());
        }
    }
}

#[cfg(not(unix))]
mod imp {
    pub fn install() {}
}

/// Install the segfault handler; a no-op outside POSIX.
pub fn install_segfault_handler() {
    imp::install();
}
