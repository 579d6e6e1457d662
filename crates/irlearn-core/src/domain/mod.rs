//! Pure domain entities for the learning workflow.
//!
//! Everything in here is plain data plus validation — no I/O, no async,
//! no OS calls.  The application layer in `irlearn-app` orchestrates these
//! types; the infrastructure layer serialises them.

pub mod buttons;
pub mod profile;
pub mod signal;
