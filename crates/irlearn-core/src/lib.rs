//! # irlearn-core
//!
//! Shared domain library for IR-Learn containing the captured-signal model,
//! the button catalogue, and the remote-profile builder.
//!
//! This crate is consumed by the learning application and by any future
//! playback or editing front end.  It has zero dependencies on OS APIs,
//! UI frameworks, async runtimes, or the file system.
//!
//! # Architecture overview (for beginners)
//!
//! IR-Learn teaches the receiver an existing remote control: the user
//! presses each button on the old remote, the demodulator hands us one
//! captured signal per press, and the result is saved as a named profile.
//!
//! This crate is the shared foundation.  It defines:
//!
//! - **`domain::signal`** – What a captured infrared signal looks like:
//!   either a decoded protocol/address/command triple or raw timing data.
//!
//! - **`domain::buttons`** – The fixed, ordered catalogue of logical button
//!   names ("Power", "Vol_up", …) that the learning workflow walks through.
//!
//! - **`domain::profile`** – The accumulation of confirmed (button, signal)
//!   pairs and the immutable `RemoteProfile` snapshot handed to storage.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `irlearn_core::RemoteProfile` instead of `irlearn_core::domain::profile::RemoteProfile`.
pub use domain::buttons::{ButtonSequence, SequenceError};
pub use domain::profile::{ProfileBuilder, ProfileButton, ProfileError, RemoteProfile};
pub use domain::signal::{IrMessage, IrSignal, RawTimings};
