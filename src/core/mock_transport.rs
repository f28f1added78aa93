//! Mock SSH transport for testing without real PCs
//!
//! Simulates the remote Windows shell and its SFTP file system. Every
//! channel opened by one [`MockConnector`] shares the same remote state, so
//! tests can observe what a host saw across several sessions.

use super::transport::{CommandOutput, Connector, RemoteChannel};
use crate::constants::PROBE_COMMAND;
use crate::models::HostProfile;
use crate::utils::SessionError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Simulation types to test different host conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockHost {
    /// Reachable PC answering every command
    Healthy,
    /// Nothing listening on the SSH port
    Unreachable,
    /// SSH server rejects the password
    AuthRejected,
    /// TCP connect never completes
    ConnectHangs,
    /// Channel opens but the probe command writes to stderr
    ProbeFails,
    /// Channel opens, then every operation dies mid-flight
    TransportFault,
    /// Channel opens, then commands never return
    Hangs,
    /// Commands work but SFTP writes are refused
    UploadFails,
    /// Commands work but SFTP stat never returns
    StatHangs,
}

/// Everything the simulated host observed
#[derive(Debug, Clone, Default)]
pub struct RemoteLog {
    pub connects: usize,
    pub closes: usize,
    /// `(connect, command)` timeouts handed to each connect
    pub timeouts: Vec<(Duration, Duration)>,
    pub commands: Vec<String>,
    pub uploads: Vec<String>,
    pub files: HashMap<String, Vec<u8>>,
}

pub struct MockConnector {
    host: MockHost,
    log: Arc<Mutex<RemoteLog>>,
    responses: Arc<HashMap<String, CommandOutput>>,
}

impl MockConnector {
    pub fn new(host: MockHost) -> Self {
        Self {
            host,
            log: Arc::new(Mutex::new(RemoteLog::default())),
            responses: Arc::new(HashMap::new()),
        }
    }

    /// Canned output for an exact command string
    pub fn with_response(mut self, command: &str, stdout: &[u8], stderr: &[u8]) -> Self {
        let output = CommandOutput {
            stdout: stdout.to_vec(),
            stderr: stderr.to_vec(),
            exit_status: if stderr.is_empty() { 0 } else { 1 },
        };
        Arc::make_mut(&mut self.responses).insert(command.to_string(), output);
        self
    }

    pub fn snapshot(&self) -> RemoteLog {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        profile: &HostProfile,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Box<dyn RemoteChannel>, SessionError> {
        match self.host {
            MockHost::Unreachable => {
                return Err(SessionError::Connection(format!(
                    "SSH connect to {}:{} failed: No route to host (os error 113)",
                    profile.host, profile.port
                )))
            }
            MockHost::AuthRejected => return Err(SessionError::Authentication(profile.user.clone())),
            MockHost::ConnectHangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            _ => {}
        }

        {
            let mut log = self.log.lock().unwrap();
            log.connects += 1;
            log.timeouts.push((connect_timeout, command_timeout));
        }
        Ok(Box::new(MockChannel {
            host: self.host,
            log: self.log.clone(),
            responses: self.responses.clone(),
            closed: false,
        }))
    }
}

struct MockChannel {
    host: MockHost,
    log: Arc<Mutex<RemoteLog>>,
    responses: Arc<HashMap<String, CommandOutput>>,
    closed: bool,
}

impl MockChannel {
    fn reset() -> SessionError {
        SessionError::Transport("Connection reset by peer (os error 104)".to_string())
    }
}

#[async_trait]
impl RemoteChannel for MockChannel {
    async fn exec(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        self.log.lock().unwrap().commands.push(command.to_string());

        match self.host {
            MockHost::TransportFault => return Err(Self::reset()),
            MockHost::Hangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            MockHost::ProbeFails if command == PROBE_COMMAND => {
                return Ok(CommandOutput {
                    stdout: Vec::new(),
                    stderr: b"The system is shutting down.\r\n".to_vec(),
                    exit_status: 1,
                })
            }
            _ => {}
        }

        if let Some(output) = self.responses.get(command) {
            return Ok(output.clone());
        }
        let stdout = if command == PROBE_COMMAND {
            b"hello\r\n".to_vec()
        } else {
            Vec::new()
        };
        Ok(CommandOutput {
            stdout,
            stderr: Vec::new(),
            exit_status: 0,
        })
    }

    async fn file_exists(&mut self, remote_path: &str) -> Result<bool, SessionError> {
        match self.host {
            MockHost::TransportFault => return Err(Self::reset()),
            MockHost::StatHangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            _ => {}
        }
        Ok(self.log.lock().unwrap().files.contains_key(remote_path))
    }

    async fn upload(&mut self, remote_path: &str, contents: &[u8]) -> Result<(), SessionError> {
        match self.host {
            MockHost::TransportFault => Err(Self::reset()),
            MockHost::UploadFails => Err(SessionError::Transfer(format!(
                "open {}: permission denied",
                remote_path
            ))),
            _ => {
                let mut log = self.log.lock().unwrap();
                log.uploads.push(remote_path.to_string());
                log.files.insert(remote_path.to_string(), contents.to_vec());
                Ok(())
            }
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.lock().unwrap().closes += 1;
        }
    }
}
