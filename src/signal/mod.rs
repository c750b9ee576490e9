//! Signal handling for interrupted runs (SIGINT/SIGTERM)
//!
//! On the first signal the result feed stops reading and closes its channel,
//! so the aggregator finishes with whatever arrived and a report is still
//! printed. On a second signal the process exits immediately with the Nagios
//! UNKNOWN code.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Exit code used when the run is abandoned (Nagios UNKNOWN)
pub const EXIT_CODE_UNKNOWN: i32 = 3;

/// Signal handler state, shared with the feed thread
#[derive(Debug, Default)]
pub struct SignalState {
    /// First signal received (stop feeding)
    cancel_requested: AtomicBool,
    /// Second signal received (exit now)
    immediate_exit: AtomicBool,
    /// Signals received so far
    signal_count: AtomicU8,
}

impl SignalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// Check if immediate exit has been requested (double-SIGINT)
    pub fn is_immediate_exit(&self) -> bool {
        self.immediate_exit.load(Ordering::SeqCst)
    }

    pub fn signal_count(&self) -> u8 {
        self.signal_count.load(Ordering::SeqCst)
    }

    /// Record a signal and return the action to take
    pub fn handle_signal(&self) -> SignalAction {
        let count = self.signal_count.fetch_add(1, Ordering::SeqCst);

        if count == 0 {
            self.cancel_requested.store(true, Ordering::SeqCst);
            SignalAction::StopFeed
        } else if count == 1 {
            self.immediate_exit.store(true, Ordering::SeqCst);
            SignalAction::ImmediateExit
        } else {
            SignalAction::Ignore
        }
    }
}

/// Action to take in response to a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Stop reading results and report what was received
    StopFeed,
    /// Exit without a report
    ImmediateExit,
    /// Ignore (third+ signal)
    Ignore,
}

/// Installs the process signal handler
pub struct SignalHandler {
    state: Arc<SignalState>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(SignalState::new()),
        }
    }

    /// Shared state, to hand to the feed
    pub fn state(&self) -> Arc<SignalState> {
        Arc::clone(&self.state)
    }

    /// Install handlers for SIGINT and SIGTERM.
    ///
    /// Must be called at most once per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let state = Arc::clone(&self.state);
        ctrlc::set_handler(move || match state.handle_signal() {
            SignalAction::StopFeed => {
                tracing::warn!("received interrupt, reporting results received so far");
            }
            SignalAction::ImmediateExit => {
                tracing::warn!("received second interrupt, exiting");
                std::process::exit(EXIT_CODE_UNKNOWN);
            }
            SignalAction::Ignore => {}
        })
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}
