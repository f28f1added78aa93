//! # Domain Models
//!
//! Host profiles, the `(output, error)` action contract, and liveness status.
//!
//! ## Security Design
//!
//! The [`SecureString`] type holds passwords:
//! - Password data is zeroed on drop to prevent leakage via swap/core dumps
//! - Never exposed in `Debug` or `Display` implementations
//!
//! Profiles are keyed by host. A profile with an empty host is never
//! persisted and can never be looked up.

pub mod credentials;
pub mod status;

pub use credentials::{HostProfile, SecureString};
pub use status::{ActionResult, HostStatus};
