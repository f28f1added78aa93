//! winturn - wake, sleep and power off Windows PCs remotely
//!
//! Core library exposing the Host Session, the dispatch policy, and the
//! transports and stores they run on.

// Public modules
pub mod config;
pub mod constants;
pub mod core;
pub mod logger;
pub mod models;
pub mod normalize;
pub mod platform;
pub mod utils;

// Re-export commonly used types
pub use config::ControlConfig;
pub use core::{
    validate_profile, CommandSet, DispatchOutcome, Dispatcher, HostSession, PowerAction,
    ProfileStore, SessionSettings, WakeDispatcher,
};
pub use models::{ActionResult, HostProfile, HostStatus, SecureString};
pub use platform::{JsonProfileStore, SshConnector};
pub use utils::{ConfigError, SessionError, StoreError, ValidationError, WakeError};
