//! Remote-execution transport abstraction
//!
//! These traits allow the Host Session to be tested without real PCs.
//! The SSH implementation lives in `src/platform/ssh.rs`.

use crate::models::HostProfile;
use crate::utils::SessionError;
use async_trait::async_trait;
use std::time::Duration;

/// Raw output of one remote command, before code-page decoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_status: i32,
}

/// An open, authenticated remote-execution channel to one host
///
/// Owned exclusively by the Host Session that opened it.
#[async_trait]
pub trait RemoteChannel: Send {
    /// Run a command on the remote shell and capture both output streams
    async fn exec(&mut self, command: &str) -> Result<CommandOutput, SessionError>;

    /// Whether a file exists at `remote_path` (SFTP stat)
    async fn file_exists(&mut self, remote_path: &str) -> Result<bool, SessionError>;

    /// Write `contents` to `remote_path`, replacing any existing file
    async fn upload(&mut self, remote_path: &str, contents: &[u8]) -> Result<(), SessionError>;

    /// Release the channel. Best-effort and idempotent.
    fn close(&mut self);
}

/// Opens remote-execution channels from host profiles
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a channel using the profile's host, port and credentials.
    ///
    /// `connect_timeout` bounds TCP connect, handshake and authentication;
    /// `command_timeout` bounds each later call on the returned channel.
    /// Unknown host keys are accepted without verification.
    async fn connect(
        &self,
        profile: &HostProfile,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Box<dyn RemoteChannel>, SessionError>;
}
