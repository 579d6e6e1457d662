//! Mock signal source for unit testing.
//!
//! Allows tests to inject synthetic [`IrSignal`]s without hardware, while
//! enforcing the same delivery contract a real demodulator wrapper would:
//! injections are dropped unless the source is running and not paused.

use std::sync::Mutex;

use irlearn_core::IrSignal;
use tracing::debug;

use super::{CaptureError, CaptureHandler, Posture, SignalSource};

/// Call counters exposed to tests asserting posture discipline.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PostureCalls {
    pub start: u32,
    pub stop: u32,
    pub pause: u32,
    pub resume: u32,
}

/// A mock implementation of [`SignalSource`] driven by the test.
pub struct MockSignalSource {
    handler: Mutex<Option<CaptureHandler>>,
    posture: Mutex<Posture>,
    calls: Mutex<PostureCalls>,
}

impl MockSignalSource {
    /// Creates a stopped mock with no handler registered.
    pub fn new() -> Self {
        Self {
            handler: Mutex::new(None),
            posture: Mutex::new(Posture::Stopped),
            calls: Mutex::new(PostureCalls::default()),
        }
    }

    /// Injects a synthetic capture, as if delivered from hardware.
    ///
    /// Returns `true` if the handler was invoked, `false` if the injection
    /// was dropped because the source was stopped or paused — mirroring a
    /// real receiver whose demodulation is disabled.
    pub fn inject_signal(&self, signal: IrSignal) -> bool {
        if *self.posture.lock().expect("lock poisoned") != Posture::Running {
            debug!("injected signal dropped: source not running");
            return false;
        }
        let guard = self.handler.lock().expect("lock poisoned");
        match guard.as_ref() {
            Some(handler) => {
                handler(signal);
                true
            }
            None => false,
        }
    }

    /// Current receiver posture.
    pub fn posture(&self) -> Posture {
        *self.posture.lock().expect("lock poisoned")
    }

    /// Snapshot of how many times each posture operation was called.
    pub fn calls(&self) -> PostureCalls {
        *self.calls.lock().expect("lock poisoned")
    }
}

impl Default for MockSignalSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSource for MockSignalSource {
    fn set_capture_handler(&self, handler: CaptureHandler) {
        *self.handler.lock().expect("lock poisoned") = Some(handler);
    }

    fn start(&self) -> Result<(), CaptureError> {
        if self.handler.lock().expect("lock poisoned").is_none() {
            return Err(CaptureError::NoHandler);
        }
        self.calls.lock().expect("lock poisoned").start += 1;
        *self.posture.lock().expect("lock poisoned") = Posture::Running;
        Ok(())
    }

    fn stop(&self) {
        self.calls.lock().expect("lock poisoned").stop += 1;
        *self.posture.lock().expect("lock poisoned") = Posture::Stopped;
    }

    fn pause(&self) {
        let mut posture = self.posture.lock().expect("lock poisoned");
        // Pausing a stopped source must not revive it.
        if *posture == Posture::Running {
            *posture = Posture::Paused;
        }
        self.calls.lock().expect("lock poisoned").pause += 1;
    }

    fn resume(&self) {
        let mut posture = self.posture.lock().expect("lock poisoned");
        if *posture == Posture::Paused {
            *posture = Posture::Running;
        }
        self.calls.lock().expect("lock poisoned").resume += 1;
    }
}
