//! Ctrl-C handling.
//!
//! The default SIGINT action would kill the process mid-command. Instead a
//! listener thread records the interrupt in a shared flag and wakes whoever
//! is waiting for input; the shell checks the flag between commands and says
//! goodbye. Child git processes in the foreground process group still receive
//! the terminal's SIGINT themselves.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::{Context as _, Result};
use tracing::{debug, info};

/// Shared flag set once the operator pressed Ctrl-C.
pub type InterruptFlag = Arc<AtomicBool>;

/// Start listening for SIGINT. Each signal sets the returned flag and then
/// calls `on_interrupt`. Returns once the handler is registered.
pub fn setup_signal_handlers<F>(on_interrupt: F) -> Result<InterruptFlag>
where
    F: Fn() + Send + 'static,
{
    let flag = Arc::new(AtomicBool::new(false));
    let flag_clone = flag.clone();
    let (ready_tx, ready_rx) = mpsc::sync_channel::<io::Result<()>>(1);

    thread::Builder::new()
        .name("signal-listener".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            runtime.block_on(listen(flag_clone, on_interrupt, ready_tx));
        })
        .context("failed to spawn signal listener")?;

    ready_rx
        .recv()
        .context("signal listener exited during startup")?
        .context("failed to register SIGINT handler")?;
    debug!("SIGINT handler registered");
    Ok(flag)
}

#[cfg(unix)]
async fn listen<F: Fn()>(flag: InterruptFlag, on_interrupt: F, ready: mpsc::SyncSender<io::Result<()>>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupts = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    while interrupts.recv().await.is_some() {
        info!("received SIGINT (Ctrl+C)");
        flag.store(true, Ordering::SeqCst);
        on_interrupt();
    }
}

#[cfg(windows)]
async fn listen<F: Fn()>(flag: InterruptFlag, on_interrupt: F, ready: mpsc::SyncSender<io::Result<()>>) {
    let mut interrupts = match tokio::signal::windows::ctrl_c() {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    while interrupts.recv().await.is_some() {
        info!("received Ctrl+C");
        flag.store(true, Ordering::SeqCst);
        on_interrupt();
    }
}

/// Whether an interrupt has been received.
pub fn is_interrupt_requested(flag: &InterruptFlag) -> bool {
    flag.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_starts_clear() {
        let flag = setup_signal_handlers(|| {}).unwrap();
        assert!(!is_interrupt_requested(&flag));
        flag.store(true, Ordering::SeqCst);
        assert!(is_interrupt_requested(&flag));
    }
}
