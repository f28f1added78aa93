//! # Application-Wide Constants
//!
//! Centralized configuration values and magic numbers used throughout winturn.
//!
//! Values that a deployment may want to change (timeouts, command set, code
//! page) have a default here and an override in [`crate::config`].

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time a single remote command may run before the call fails
///
/// **Rationale**: power commands return immediately on the remote side;
/// anything slower than this means the channel is wedged or the host is
/// already going down.
pub const COMMAND_TIMEOUT_SECS: u64 = 15;

/// Maximum time to establish the SSH channel (TCP connect + handshake + auth)
pub const CONNECT_TIMEOUT_SECS: u64 = 15;

// ============================================================================
// Network Defaults
// ============================================================================

/// Default SSH port for Windows OpenSSH Server
pub const DEFAULT_SSH_PORT: u16 = 22;

/// UDP port used for Wake-on-LAN magic packets (discard service)
pub const DEFAULT_WAKE_PORT: u16 = 9;

/// Limited broadcast address used when no wake destination is configured
pub const BROADCAST_ADDRESS: &str = "255.255.255.255";

// ============================================================================
// Remote Host
// ============================================================================

/// Code page the Windows remote shell writes its output in
///
/// Windows OpenSSH inherits the console's legacy ANSI code page, so output
/// is not UTF-8 unless the host has been reconfigured.
pub const DEFAULT_REMOTE_ENCODING: &str = "gbk";

/// Trivial command used to confirm the remote shell is responsive
pub const PROBE_COMMAND: &str = "echo hello";

/// File name of the staged suspend helper
///
/// Must never change between releases, otherwise the existence check before
/// upload stops short-circuiting on hosts that already have the helper.
pub const HELPER_SCRIPT_NAME: &str = "winturn-suspend.ps1";

// ============================================================================
// Storage
// ============================================================================

/// Environment variable that relocates the state directory
pub const HOME_ENV: &str = "MWT_HOME";

/// State directory, relative to the working directory by default
pub const STATE_DIR: &str = ".mwt";

/// Profile cache file name inside [`STATE_DIR`]
pub const PROFILE_FILE: &str = "config.json";

/// Optional control settings file inside [`STATE_DIR`]
pub const SETTINGS_FILE: &str = "settings.json";

// ============================================================================
// UI-facing messages
// ============================================================================

/// Shown when an online action completes with an empty error
pub const COMPLETED_MESSAGE: &str = "Completed.";

/// Shown when the SSH channel cannot be established
pub const UNAVAILABLE_MESSAGE: &str = "PC unavailable";

/// Shown when the channel opens but the probe command fails
pub const ASLEEP_MESSAGE: &str = "PC is already asleep or off";
