//! Profile accumulation and the immutable `RemoteProfile` snapshot.
//!
//! During a learning session the [`ProfileBuilder`] collects confirmed
//! (slot, signal) pairs.  Not every slot needs a signal — the user may skip
//! buttons their remote does not have.  On finish, [`ProfileBuilder::finalize`]
//! validates the profile name and produces a [`RemoteProfile`] that is handed
//! to storage and never mutated afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::buttons::ButtonSequence;
use super::signal::IrSignal;

/// Error type for profile building.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile name is empty after trimming whitespace.
    #[error("profile name is empty")]
    IncompleteName,

    /// A slot index outside the button catalogue was recorded.
    #[error("slot {slot} is out of range for a catalogue of {len} buttons")]
    SlotOutOfRange { slot: usize, len: usize },
}

/// One stored button: its slot in the learning sequence, its name, and the
/// captured signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileButton {
    /// Position in the learning sequence the signal was captured for.
    pub slot: usize,
    /// Button name copied from the catalogue at finalize time.
    pub button: String,
    /// The captured signal.
    pub signal: IrSignal,
}

/// A named, ordered collection of button→signal associations.
///
/// Created only by [`ProfileBuilder::finalize`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProfile {
    /// Stable identity, independent of the user-chosen name.
    pub id: Uuid,
    /// User-chosen profile name (trimmed, non-empty).
    pub name: String,
    /// Recorded buttons in slot order.  Skipped slots are absent.
    pub buttons: Vec<ProfileButton>,
}

impl RemoteProfile {
    /// Looks up the signal recorded for `button`, if any.
    pub fn signal_for(&self, button: &str) -> Option<&IrSignal> {
        self.buttons
            .iter()
            .find(|b| b.button == button)
            .map(|b| &b.signal)
    }
}

/// Accumulates captured signals during a learning session.
///
/// A `BTreeMap` keyed by slot index keeps the recorded pairs in learning
/// order without tracking a separate position list.
#[derive(Debug)]
pub struct ProfileBuilder {
    buttons: ButtonSequence,
    slots: BTreeMap<usize, IrSignal>,
}

impl ProfileBuilder {
    /// Creates an empty builder over the given catalogue.
    pub fn new(buttons: ButtonSequence) -> Self {
        Self {
            buttons,
            slots: BTreeMap::new(),
        }
    }

    /// Stores or overwrites the signal for `slot`.
    ///
    /// Overwriting is legal: re-learning a button replaces the earlier
    /// capture.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::SlotOutOfRange`] when `slot` is not a valid
    /// catalogue index.
    pub fn record(&mut self, slot: usize, signal: IrSignal) -> Result<(), ProfileError> {
        if slot >= self.buttons.len() {
            return Err(ProfileError::SlotOutOfRange {
                slot,
                len: self.buttons.len(),
            });
        }
        if self.slots.insert(slot, signal).is_some() {
            debug!(slot, "overwrote previously recorded signal");
        }
        Ok(())
    }

    /// Leaves `slot` empty, discarding any earlier capture for it.
    pub fn skip(&mut self, slot: usize) {
        self.slots.remove(&slot);
    }

    /// Number of slots with a recorded signal.
    pub fn recorded_count(&self) -> usize {
        self.slots.len()
    }

    /// Produces the immutable profile snapshot.
    ///
    /// Non-consuming so the caller can retry after a storage failure with
    /// the same accumulated signals.  The builder is discarded by the
    /// session once the profile has been handed off successfully.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::IncompleteName`] when `name` trims to the
    /// empty string.
    pub fn finalize(&self, name: &str) -> Result<RemoteProfile, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::IncompleteName);
        }

        let buttons = self
            .slots
            .iter()
            .map(|(&slot, signal)| ProfileButton {
                slot,
                // record() guarantees the slot is within the catalogue
                button: self
                    .buttons
                    .name_of(slot)
                    .unwrap_or_default()
                    .to_string(),
                signal: signal.clone(),
            })
            .collect();

        Ok(RemoteProfile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            buttons,
        })
    }
}
