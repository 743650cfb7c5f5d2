//! Unix signal handling for the scheduling loop.
//!
//! Signals are turned into [`SignalMessage`]s on a background thread. The
//! D-Bus monitors and the config watcher feed the same channel, so the main
//! loop has a single place to wait on.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2},
    iterator::Signals,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// Events that wake the scheduling loop before its planned time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalMessage {
    /// Reload the configuration file (SIGUSR2, config watcher)
    Reload,
    /// Re-evaluate and re-poll the location now (SIGUSR1)
    Refresh,
    /// Stop the loop (SIGTERM, SIGINT, SIGHUP)
    Shutdown,
    /// Wall clock was set or the time zone changed
    TimeChange,
    /// System is going to sleep or resuming from it
    Sleep { resuming: bool },
}

/// Channel ends and the running flag shared with the signal thread.
pub struct SignalState {
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Cloned into the D-Bus monitors and the config watcher
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Map a raw signal number to the message it produces.
pub fn message_for_signal(signal: i32) -> Option<SignalMessage> {
    match signal {
        SIGUSR1 => Some(SignalMessage::Refresh),
        SIGUSR2 => Some(SignalMessage::Reload),
        SIGINT | SIGTERM | SIGHUP => Some(SignalMessage::Shutdown),
        _ => None,
    }
}

/// Register the handled signals and spawn the forwarding thread.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = mpsc::channel::<SignalMessage>();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = running.clone();
    let sender = signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            let Some(message) = message_for_signal(sig) else {
                continue;
            };

            log_pipe!();
            match (&message, sig) {
                (SignalMessage::Refresh, _) => log_info!("Received refresh signal"),
                (SignalMessage::Reload, _) => log_info!("Received configuration reload signal"),
                (_, SIGINT) if debug_enabled => {
                    log_info!("Received SIGINT (Ctrl+C), shutting down...")
                }
                (_, SIGINT) => log_info!("Received interrupt signal, shutting down..."),
                (_, SIGHUP) => log_info!("Terminal disconnected, shutting down..."),
                _ => log_info!("Received termination request, shutting down..."),
            }

            let shutdown = message == SignalMessage::Shutdown;
            if shutdown {
                running_clone.store(false, Ordering::SeqCst);
            }

            if sender.send(message).is_err() {
                // Main loop is gone
                running_clone.store(false, Ordering::SeqCst);
                break;
            }

            if shutdown {
                break;
            }
        }
    });

    Ok(SignalState {
        running,
        signal_receiver,
        signal_sender,
    })
}
