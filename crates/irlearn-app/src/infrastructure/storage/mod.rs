//! File-system storage for the learning application.
//!
//! - **`config`** – TOML application configuration in the platform config
//!   directory.
//! - **`profiles`** – the persistence collaborator the workflow hands
//!   finished [`RemoteProfile`](irlearn_core::RemoteProfile)s to, plus its
//!   TOML file implementation.

pub mod config;
pub mod profiles;
