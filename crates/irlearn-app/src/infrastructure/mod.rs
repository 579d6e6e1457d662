//! Infrastructure layer for the learning application.
//!
//! Contains the outward-facing adapters: the infrared capture seam, the
//! file-system storage for configuration and profiles, and the console UI
//! bridge.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `irlearn_core`, but MUST NOT be imported by the domain layer.

pub mod signal_source;
pub mod storage;
pub mod ui_bridge;
