//! Simulated infrared receiver for the demo binary and end-to-end runs.
//!
//! Stands in for the hardware demodulator: a fixed delay after each arm
//! (`start()`/`resume()`), it delivers one synthetic NEC-style signal with a
//! command code that advances on every capture, so consecutive buttons learn
//! distinct codes.  The posture contract is identical to a real backend —
//! pausing or stopping suppresses the pending delivery.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use irlearn_core::IrSignal;
use tracing::{debug, trace};

use super::{CaptureError, CaptureHandler, Posture, SignalSource};

/// Device address used for all synthetic signals.
const SIMULATED_ADDRESS: u32 = 0x04;
/// First synthetic command code; subsequent captures count up from here.
const SIMULATED_COMMAND_BASE: u32 = 0x10;

struct Shared {
    handler: Mutex<Option<CaptureHandler>>,
    posture: Mutex<Posture>,
    /// One delivery is permitted per arm; cleared when it fires.
    armed: AtomicBool,
    /// Monotone capture counter driving the synthetic command codes.
    captures: AtomicU32,
    delay: Duration,
}

impl Shared {
    fn posture(&self) -> Posture {
        *self.posture.lock().expect("lock poisoned")
    }

    fn set_posture(&self, posture: Posture) {
        *self.posture.lock().expect("lock poisoned") = posture;
    }
}

/// A [`SignalSource`] that synthesises captures on a timer.
pub struct SimulatedReceiver {
    shared: Arc<Shared>,
}

impl SimulatedReceiver {
    /// Creates a receiver that delivers `delay` after each arm.
    ///
    /// Must be used from within a tokio runtime: every arm spawns a
    /// short-lived delivery task.
    pub fn new(delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                handler: Mutex::new(None),
                posture: Mutex::new(Posture::Stopped),
                armed: AtomicBool::new(false),
                captures: AtomicU32::new(0),
                delay,
            }),
        }
    }

    /// Arms one delivery and schedules it.
    fn arm(&self) {
        self.shared.armed.store(true, Ordering::SeqCst);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(shared.delay).await;
            if shared.posture() != Posture::Running {
                trace!("simulated delivery suppressed: receiver not running");
                return;
            }
            // swap() guarantees at most one delivery per arm even when
            // several delivery tasks from start/resume cycles overlap.
            if !shared.armed.swap(false, Ordering::SeqCst) {
                return;
            }
            let n = shared.captures.fetch_add(1, Ordering::SeqCst);
            let signal = IrSignal::decoded(
                "NEC",
                SIMULATED_ADDRESS,
                SIMULATED_COMMAND_BASE + n,
                false,
            );
            debug!(capture = n, "simulated receiver delivering signal");
            if let Some(handler) = shared.handler.lock().expect("lock poisoned").as_ref() {
                handler(signal);
            }
        });
    }
}

impl SignalSource for SimulatedReceiver {
    fn set_capture_handler(&self, handler: CaptureHandler) {
        *self.shared.handler.lock().expect("lock poisoned") = Some(handler);
    }

    fn start(&self) -> Result<(), CaptureError> {
        if self.shared.handler.lock().expect("lock poisoned").is_none() {
            return Err(CaptureError::NoHandler);
        }
        if self.shared.posture() == Posture::Running {
            return Ok(());
        }
        self.shared.set_posture(Posture::Running);
        self.arm();
        Ok(())
    }

    fn stop(&self) {
        self.shared.set_posture(Posture::Stopped);
        self.shared.armed.store(false, Ordering::SeqCst);
    }

    fn pause(&self) {
        if self.shared.posture() == Posture::Running {
            self.shared.set_posture(Posture::Paused);
        }
    }

    fn resume(&self) {
        if self.shared.posture() == Posture::Paused {
            self.shared.set_posture(Posture::Running);
            self.arm();
        }
    }
}
