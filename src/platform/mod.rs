//! Platform-specific implementations (SSH transport, on-disk profile store)
//!
//! All I/O against real hosts and the local file system is isolated here;
//! `core` only sees the traits these types implement.

pub mod profile_file;
pub mod ssh;

pub use profile_file::JsonProfileStore;
pub use ssh::{SshChannel, SshConnector};
