//! Intent vocabulary and the ordered event mailbox.
//!
//! Every input source — the hardware capture callback and the UI façade —
//! funnels into one queue consumed strictly one-at-a-time by the state
//! machine.  That single-consumer ordering is what keeps the machine free of
//! locks: the only concurrency lives at the boundary where producers enqueue.
//!
//! # Why a channel instead of direct calls? (for beginners)
//!
//! The capture callback runs on the demodulator's own execution context, not
//! ours.  If it mutated session state directly, every field of the session
//! would need a mutex.  By restricting the callback to *enqueueing an intent*,
//! all mutation happens on the one task that drains the queue, and ordinary
//! `&mut self` methods are safe.

use irlearn_core::IrSignal;
use tokio::sync::mpsc;
use tracing::debug;

/// A high-level intent consumed by the state machine.
///
/// `SignalReceived` is produced only by the capture callback; everything
/// else is produced by the UI façade.
#[derive(Debug, Clone, PartialEq)]
pub enum LearnEvent {
    /// The demodulator delivered a captured signal.
    SignalReceived(IrSignal),
    /// Accept the pending signal for the current button and advance.
    Save,
    /// Advance past the current button without recording.
    Skip,
    /// Discard the pending signal and listen again for the same button.
    Retry,
    /// Stop early and proceed to naming with the buttons learned so far.
    Finish,
    /// Ask to leave the workflow (opens the exit confirmation).
    AskExit,
    /// Exit confirmed: abandon the session.
    ExitConfirmed,
    /// Exit cancelled: return to where the session was.
    ExitCancelled,
    /// From the exit confirmation: keep what was learned and go name it.
    FinishConfirmed,
    /// The user submitted a profile name.
    NameEntered(String),
}

/// Sending half of the event mailbox.  Cheap to clone; one per producer.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<LearnEvent>,
}

impl EventSender {
    /// Enqueues an intent for the state machine.
    ///
    /// A send after the consumer has gone (late hardware delivery during
    /// teardown) is logged and dropped — by then the session is over and
    /// the event could not change anything.
    pub fn send(&self, event: LearnEvent) {
        if self.tx.send(event).is_err() {
            debug!("event dropped: session consumer is gone");
        }
    }
}

/// Receiving half of the event mailbox.  Exactly one per session.
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<LearnEvent>,
}

impl EventReceiver {
    /// Waits for the next intent; `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<LearnEvent> {
        self.rx.recv().await
    }
}

/// Creates the mailbox for one learning session.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_are_delivered_in_send_order() {
        let (tx, mut rx) = event_channel();

        // Interleave a hardware delivery between UI intents, as happens when
        // the user presses a remote button while tapping the console.
        tx.send(LearnEvent::SignalReceived(IrSignal::decoded("NEC", 1, 2, false)));
        tx.send(LearnEvent::Save);
        tx.send(LearnEvent::Retry);

        assert!(matches!(
            rx.recv().await,
            Some(LearnEvent::SignalReceived(_))
        ));
        assert_eq!(rx.recv().await, Some(LearnEvent::Save));
        assert_eq!(rx.recv().await, Some(LearnEvent::Retry));
    }

    #[tokio::test]
    async fn test_multiple_producers_share_one_queue() {
        let (tx, mut rx) = event_channel();
        let capture_side = tx.clone();

        capture_side.send(LearnEvent::SignalReceived(IrSignal::decoded(
            "NEC", 1, 2, false,
        )));
        tx.send(LearnEvent::Save);

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silently_dropped() {
        let (tx, rx) = event_channel();
        drop(rx);

        // Must not panic: late hardware deliveries race session teardown.
        tx.send(LearnEvent::Save);
    }
}
