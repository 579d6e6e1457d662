//! Button catalogue: the fixed, ordered list of logical buttons to learn.
//!
//! The learning workflow walks this sequence strictly forward, one button
//! per confirmed-or-skipped step.  The catalogue is immutable once built —
//! the cursor arithmetic in the state machine relies on the length never
//! changing mid-session.

use std::sync::Arc;

use thiserror::Error;

/// Error type for catalogue construction.
#[derive(Debug, Error, PartialEq)]
pub enum SequenceError {
    /// An empty catalogue would leave the workflow with nothing to do.
    #[error("button sequence is empty; at least one button is required")]
    Empty,
}

/// Immutable ordered list of named button slots.
///
/// Cloning is cheap: the name table is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ButtonSequence {
    names: Arc<[String]>,
}

impl ButtonSequence {
    /// Builds a catalogue from an ordered list of button names.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::Empty`] when `names` is empty.
    pub fn new(names: Vec<String>) -> Result<Self, SequenceError> {
        if names.is_empty() {
            return Err(SequenceError::Empty);
        }
        Ok(Self {
            names: names.into(),
        })
    }

    /// The standard catalogue of a typical TV/media remote.
    ///
    /// Order matters: this is the sequence the user is walked through, most
    /// important buttons first.
    pub fn standard() -> Self {
        let names = [
            "Power", "Eject", "Input", "Menu", "List", "Info", "Back", "Ok", "Up", "Down", "Left",
            "Right", "Mute", "Vol_up", "Vol_down", "Ch_next", "Ch_prev", "Fast_fo", "Fast_ba",
            "Play_pa", "Pause", "Play", "Stop",
        ];
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Number of button slots.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` only for a catalogue that bypassed [`ButtonSequence::new`].
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the name at `index`, or `None` when out of range.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Returns the slot index of `name`, or `None` when unknown.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Iterates over the button names in learning order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
