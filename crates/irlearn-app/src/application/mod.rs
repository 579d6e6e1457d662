//! Application layer of the learning workflow.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules) and the infrastructure (hardware/storage/UI).
//!
//! The code in this layer:
//!
//! - **Orchestrates** domain objects to fulfil a user goal ("walk the user
//!   through learning every button and persist the result").
//! - **Depends on abstractions** (traits) rather than concrete
//!   implementations, so the infrared demodulator and the profile store can
//!   be swapped without changing this code.
//! - **Contains no hardware calls, no file system access, no rendering.**
//!
//! # Sub-modules
//!
//! - **`events`** – The intent vocabulary and the single ordered mailbox
//!   every input source (hardware capture callback, UI) feeds into.
//!
//! - **`learn`** – The workflow state machine.  This is the heart of the
//!   application: it owns the button cursor and the captured-signal slot,
//!   and decides every transition.

pub mod events;
pub mod learn;
