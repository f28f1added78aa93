//! # Utilities Module
//!
//! Cross-cutting concerns shared by the core and platform modules.
//!
//! ## Design Notes
//!
//! Error types live here to avoid circular dependencies between `core` and
//! `platform`. Session operations report failures through these types
//! internally, and the Host Session flattens them into the
//! `(output, error)` contract at its public boundary.

pub mod errors;

pub use errors::{ConfigError, SessionError, StoreError, ValidationError, WakeError};
