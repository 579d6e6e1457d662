//! Captured infrared signal model.
//!
//! A signal arrives from the demodulator in one of two shapes: a *decoded*
//! message (the demodulator recognised the protocol and extracted the
//! address/command pair) or *raw* timing data (unknown protocol; we keep the
//! mark/space durations verbatim so the signal can still be replayed).
//!
//! The protocol catalogue itself is deliberately not modelled here — the
//! demodulator reports the protocol by name and we carry that name through
//! to the stored profile untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A decoded infrared message: protocol name plus address/command pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrMessage {
    /// Protocol name as reported by the demodulator (e.g. `"NEC"`, `"RC5"`).
    pub protocol: String,
    /// Device address extracted from the frame.
    pub address: u32,
    /// Command code extracted from the frame.
    pub command: u32,
    /// `true` if the frame was a repeat frame (button held down).
    pub repeat: bool,
}

/// Raw timing capture for signals the demodulator could not decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTimings {
    /// Carrier frequency in Hz (typically 38000).
    pub frequency_hz: u32,
    /// Carrier duty cycle in the range `(0.0, 1.0)`.
    pub duty_cycle: f32,
    /// Alternating mark/space durations in microseconds.
    pub timings_us: Vec<u32>,
}

/// A captured infrared waveform.
///
/// Either decoded into a protocol/address/command triple or kept as raw
/// timing data.  Both variants are replayable and both can be stored in a
/// [`RemoteProfile`](crate::RemoteProfile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IrSignal {
    /// The demodulator recognised the protocol.
    Decoded(IrMessage),
    /// Unknown protocol; raw mark/space timings retained.
    Raw(RawTimings),
}

impl IrSignal {
    /// Convenience constructor for a decoded signal.
    pub fn decoded(protocol: impl Into<String>, address: u32, command: u32, repeat: bool) -> Self {
        IrSignal::Decoded(IrMessage {
            protocol: protocol.into(),
            address,
            command,
            repeat,
        })
    }

    /// Returns `true` for repeat frames of decoded signals.
    ///
    /// Raw captures carry no repeat flag and always return `false`.
    pub fn is_repeat(&self) -> bool {
        match self {
            IrSignal::Decoded(msg) => msg.repeat,
            IrSignal::Raw(_) => false,
        }
    }
}

impl fmt::Display for IrSignal {
    /// Renders the summary shown on the review screen.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrSignal::Decoded(msg) => write!(
                f,
                "Protocol: {}\nAddress: 0x{:X}\nCommand: 0x{:X}\nRepeat: {}",
                msg.protocol,
                msg.address,
                msg.command,
                if msg.repeat { "Yes" } else { "No" }
            ),
            IrSignal::Raw(raw) => write!(
                f,
                "Protocol: RAW\nFrequency: {} Hz\nSamples: {}",
                raw.frequency_hz,
                raw.timings_us.len()
            ),
        }
    }
}
