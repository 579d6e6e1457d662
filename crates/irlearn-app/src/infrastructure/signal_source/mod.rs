//! Infrared capture seam.
//!
//! The raw demodulator (protocol decoding, carrier detection) is an external
//! collaborator; this module only defines the contract the workflow relies
//! on.  A real backend wraps the hardware driver; the shipped binary uses
//! [`simulated::SimulatedReceiver`]; tests use [`mock::MockSignalSource`].
//!
//! # Delivery contract
//!
//! The registered capture handler fires **at most once per accepted signal**
//! while the source is running and not paused.  After `stop()` or `pause()`
//! no further deliveries occur until the matching `start()`/`resume()`.
//! `start()` while already running and `stop()` while already stopped are
//! no-ops.  The handler runs on the source's own execution context — its only
//! permitted action is to enqueue an intent, never to touch session state.

use irlearn_core::IrSignal;

pub mod mock;
pub mod simulated;

/// Callback invoked by a source for each accepted capture.
pub type CaptureHandler = Box<dyn Fn(IrSignal) + Send + Sync>;

/// Error type for capture source operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to initialise the demodulator: {0}")]
    InitFailed(String),
    #[error("no capture handler registered")]
    NoHandler,
}

/// Trait abstracting captured-signal production.
///
/// The workflow pairs every entry into a capture-expecting state with
/// `resume()` and every exit with `pause()`/`stop()`; implementations only
/// have to honour the delivery contract above.
pub trait SignalSource: Send + Sync {
    /// Registers the delivery callback.  Must be called before `start()`.
    fn set_capture_handler(&self, handler: CaptureHandler);

    /// Powers up the receiver and begins accepting signals.
    fn start(&self) -> Result<(), CaptureError>;

    /// Powers down the receiver and releases its resources.
    fn stop(&self);

    /// Temporarily suppresses deliveries without releasing the receiver.
    fn pause(&self);

    /// Re-enables deliveries after `pause()`.
    fn resume(&self);
}

/// Receiver posture shared by the in-process implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Posture {
    Stopped,
    Running,
    Paused,
}
