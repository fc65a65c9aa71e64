//! Cancellation signals that end the blocking wait.

use crate::error::{BlockerError, Result};
use std::sync::mpsc::Receiver;

/// Something the session can block on until it should unblock.
///
/// The session calls [`arm`](Self::arm) before it touches the hosts file and
/// [`wait`](Self::wait) once blocking is in place. A signal that fires in
/// between must make `wait` return immediately.
pub trait ShutdownSignal {
    /// Starts listening. The default does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BlockerError::Signal`] if the listener cannot be installed.
    fn arm(&mut self) -> Result<()> {
        Ok(())
    }

    /// Blocks until the signal fires.
    ///
    /// # Errors
    ///
    /// Returns [`BlockerError::Signal`] if the signal cannot be listened for.
    fn wait(&mut self) -> Result<()>;
}

#[cfg(unix)]
type Listener = tokio::signal::unix::Signal;

#[cfg(windows)]
type Listener = tokio::signal::windows::CtrlC;

struct Armed {
    runtime: tokio::runtime::Runtime,
    listener: Listener,
}

/// Waits for Ctrl+C (SIGINT on Unix, console Ctrl+C on Windows).
///
/// Once armed, the default "terminate" action is replaced for the rest of
/// the process, so an interrupt before [`wait`](ShutdownSignal::wait) is
/// held rather than killing the process.
#[derive(Default)]
pub struct CtrlC {
    armed: Option<Armed>,
}

impl CtrlC {
    #[must_use]
    pub const fn new() -> Self {
        Self { armed: None }
    }

    /// Returns `true` once the OS handler is installed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

fn listen() -> std::io::Result<Listener> {
    #[cfg(unix)]
    {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
    }
    #[cfg(windows)]
    {
        tokio::signal::windows::ctrl_c()
    }
}

impl ShutdownSignal for CtrlC {
    fn arm(&mut self) -> Result<()> {
        if self.armed.is_some() {
            return Ok(());
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BlockerError::Signal)?;
        let listener = {
            let _guard = runtime.enter();
            listen().map_err(BlockerError::Signal)?
        };
        tracing::debug!("Interrupt handler installed");
        self.armed = Some(Armed { runtime, listener });
        Ok(())
    }

    fn wait(&mut self) -> Result<()> {
        self.arm()?;
        let Some(Armed { runtime, listener }) = self.armed.as_mut() else {
            return Ok(());
        };
        runtime.block_on(listener.recv());
        tracing::info!("Ctrl-C received");
        Ok(())
    }
}

/// Fires when a message arrives or every sender is dropped.
impl ShutdownSignal for Receiver<()> {
    fn wait(&mut self) -> Result<()> {
        // A disconnected channel can never deliver, so treat it as fired.
        let _ = self.recv();
        Ok(())
    }
}
