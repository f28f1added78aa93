//! Core business logic (platform-agnostic)
//!
//! CRITICAL: This module MUST NOT import platform-specific code or UI frameworks.

pub mod commands;
pub mod credential;
pub mod dispatch;
pub mod session;
pub mod transport;
pub mod validation;
pub mod wake;

// Test utilities for simulated hosts (tests only)
#[cfg(test)]
pub mod mock_transport;

pub use commands::{ActionPlan, CommandSet, DispatchMode, HelperScript, PowerAction, SUSPEND_SCRIPT};
pub use credential::ProfileStore;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use session::{HostSession, SessionGuard, SessionSettings};
pub use transport::{CommandOutput, Connector, RemoteChannel};
pub use validation::validate_profile;
pub use wake::{WakeDispatcher, WakeTarget};
