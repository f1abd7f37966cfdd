use tracing::info;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// SIGINT and SIGTERM listeners, registered as soon as they are created.
///
/// Installing them before startup means a signal that arrives while the
/// callback is being registered is queued rather than killing the process.
#[cfg(unix)]
pub struct ShutdownSignals {
    interrupt: Signal,
    terminate: Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    /// Registers the handlers. Must be called inside the tokio runtime.
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Completes on the first SIGINT or SIGTERM received since `install`.
    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => info!("interrupt received; shutting down"),
            _ = self.terminate.recv() => info!("terminate received; shutting down"),
        }
    }
}

/// Ctrl-C listener, registered as soon as it is created.
#[cfg(not(unix))]
pub struct ShutdownSignals {
    interrupt: tokio::signal::windows::CtrlC,
}

#[cfg(not(unix))]
impl ShutdownSignals {
    /// Registers the handler. Must be called inside the tokio runtime.
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: tokio::signal::windows::ctrl_c()?,
        })
    }

    /// Completes on the first Ctrl-C received since `install`.
    pub async fn recv(mut self) {
        self.interrupt.recv().await;
        info!("interrupt received; shutting down");
    }
}
