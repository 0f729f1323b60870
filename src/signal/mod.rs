//! Bridges asynchronous SIGINT/SIGABRT delivery to a flag the monitor loop
//! checks once per tick.
//!
//! The handler only stores into atomics. Killing children and printing the
//! final report stay in the monitor loop.

use std::{
    io,
    sync::atomic::{AtomicBool, AtomicI32, Ordering},
};

use log::info;

use crate::error::{Result, SupervisorError};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
static SIGNAL_RECEIVED: AtomicI32 = AtomicI32::new(0);

extern "C" fn handle_shutdown_signal(signal: libc::c_int) {
    SIGNAL_RECEIVED.store(signal, Ordering::SeqCst);
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Read side of the shutdown flag.
#[derive(Debug, Clone, Copy)]
pub struct SignalBridge {
    shutdown: &'static AtomicBool,
    signal: &'static AtomicI32,
}

impl SignalBridge {
    /// Installs the process-wide handlers for SIGINT and SIGABRT.
    pub fn install() -> Result<Self> {
        for (signal, name) in [(libc::SIGINT, "SIGINT"), (libc::SIGABRT, "SIGABRT")] {
            install_handler(signal)
                .map_err(|source| SupervisorError::SignalInstall { signal: name, source })?;
        }
        info!("Signal handlers installed (SIGINT, SIGABRT)");

        Ok(Self::from_flags(&SHUTDOWN_REQUESTED, &SIGNAL_RECEIVED))
    }

    /// A bridge over caller-owned flags, with no handler attached.
    pub fn from_flags(shutdown: &'static AtomicBool, signal: &'static AtomicI32) -> Self {
        Self { shutdown, signal }
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// The last signal number seen, if any.
    pub fn received_signal(&self) -> Option<i32> {
        match self.signal.load(Ordering::SeqCst) {
            0 => None,
            signal => Some(signal),
        }
    }

    pub fn request_shutdown(&self, signal: i32) {
        self.signal.store(signal, Ordering::SeqCst);
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn install_handler(signal: libc::c_int) -> io::Result<()> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction =
            handle_shutdown_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        if libc::sigemptyset(&mut action.sa_mask) != 0 {
            return Err(io::Error::last_os_error());
        }
        if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}
