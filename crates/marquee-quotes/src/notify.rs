//! # Notification Dispatch
//!
//! Lifecycle transitions hand a [`NotificationSignal`] to a dispatcher after
//! their transaction commits. Delivery (email, SMS) happens elsewhere; from
//! the quote engine's side a dispatch is fire-and-forget and can never fail
//! the transition that produced it.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  QuoteLifecycleManager::approve / reject                                │
//! │       │  (after commit)                                                 │
//! │       ▼                                                                 │
//! │  NotificationDispatcher::dispatch(signal)                               │
//! │       │                                                                 │
//! │       ├── ChannelDispatcher ──► mpsc ──► mailer task (out of process)  │
//! │       └── LogDispatcher     ──► tracing only                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use marquee_core::NotificationSignal;

/// Receives lifecycle signals for outbound delivery.
pub trait NotificationDispatcher: Send + Sync {
    /// Hands off one signal. Must not block and must not fail the caller.
    fn dispatch(&self, signal: NotificationSignal);
}

impl<D: NotificationDispatcher + ?Sized> NotificationDispatcher for Arc<D> {
    fn dispatch(&self, signal: NotificationSignal) {
        (**self).dispatch(signal)
    }
}

// =============================================================================
// Channel Dispatcher
// =============================================================================

/// Forwards signals into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    sender: mpsc::UnboundedSender<NotificationSignal>,
}

impl ChannelDispatcher {
    pub fn new(sender: mpsc::UnboundedSender<NotificationSignal>) -> Self {
        ChannelDispatcher { sender }
    }

    /// Creates a dispatcher together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NotificationSignal>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (ChannelDispatcher::new(sender), receiver)
    }
}

impl NotificationDispatcher for ChannelDispatcher {
    fn dispatch(&self, signal: NotificationSignal) {
        if let Err(mpsc::error::SendError(signal)) = self.sender.send(signal) {
            warn!(
                event = ?signal.event,
                reference = %signal.quote_reference,
                "Notification receiver dropped, signal discarded"
            );
        }
    }
}

// =============================================================================
// Log Dispatcher
// =============================================================================

/// Logs signals and does nothing else. Default for tools and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    fn dispatch(&self, signal: NotificationSignal) {
        match serde_json::to_string(&signal) {
            Ok(payload) => info!(payload = %payload, "Notification signal"),
            Err(e) => warn!(error = %e, "Failed to encode notification signal"),
        }
    }
}
