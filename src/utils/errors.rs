//! Error types for winturn
//!
//! All error types use thiserror for clean error handling.
//! SECURITY: Error messages MUST NOT contain passwords or sensitive data.

use std::time::Duration;

/// Errors from the remote-execution (SSH) channel
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Authentication failed for user '{0}'")]
    Authentication(String),

    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("File transfer failed: {0}")]
    Transfer(String),
}

impl SessionError {
    /// Whether the channel that produced this error must be considered unusable.
    ///
    /// Connection-level errors never had a channel to begin with, and SFTP
    /// failures leave the exec channel intact.
    pub fn faults_channel(&self) -> bool {
        matches!(self, SessionError::Timeout(_) | SessionError::Transport(_))
    }
}

/// Errors from the Wake-on-LAN dispatcher
#[derive(Debug, thiserror::Error)]
pub enum WakeError {
    #[error("Invalid MAC address '{0}'")]
    InvalidMac(String),

    #[error("Failed to send Wake-on-LAN packet: {0}")]
    Send(String),
}

/// Errors from the profile store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Profile store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profile store is corrupt: {0}")]
    Parse(String),

    #[error("Failed to serialize profiles: {0}")]
    Serialize(String),
}

/// Errors from validating user-supplied profile fields
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("PC host cannot be empty")]
    EmptyHost,

    #[error("Invalid MAC address '{0}'")]
    InvalidMac(String),

    #[error("PC username cannot be empty")]
    EmptyUser,

    #[error("PC password cannot be empty")]
    EmptyPassword,

    #[error("Invalid SSH port {0}")]
    InvalidPort(u32),
}

/// Errors from loading the control configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    #[error("Unknown remote text encoding '{0}'")]
    UnknownEncoding(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
