//! Host Session: one remote-execution channel plus the power actions built on it
//!
//! A session starts disconnected and opens its channel lazily on the first
//! action that needs the remote shell. Any transport fault or timeout drops
//! the channel; the next action reconnects. Wake never touches the channel.

use crate::constants::{
    COMMAND_TIMEOUT_SECS, CONNECT_TIMEOUT_SECS, DEFAULT_REMOTE_ENCODING, PROBE_COMMAND,
};
use crate::core::commands::{
    helper_exec_command, helper_remote_path, ActionPlan, CommandSet, HelperScript, PowerAction,
};
use crate::core::transport::{Connector, RemoteChannel};
use crate::core::wake::{WakeDispatcher, WakeTarget};
use crate::models::{ActionResult, HostProfile, HostStatus};
use crate::utils::SessionError;
use encoding_rs::Encoding;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Per-deployment knobs shared by every session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub command_timeout: Duration,
    pub connect_timeout: Duration,
    pub command_set: CommandSet,
    /// Code page used to decode remote stdout/stderr
    pub encoding: &'static Encoding,
    /// SFTP directory for staged helpers; empty means the user's home
    pub helper_dir: String,
    pub wake_target: WakeTarget,
    pub wake: WakeDispatcher,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(COMMAND_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            command_set: CommandSet::default(),
            encoding: Encoding::for_label(DEFAULT_REMOTE_ENCODING.as_bytes())
                .unwrap_or(encoding_rs::GBK),
            helper_dir: String::new(),
            wake_target: WakeTarget::default(),
            wake: WakeDispatcher::default(),
        }
    }
}

fn decode(encoding: &'static Encoding, bytes: &[u8]) -> String {
    encoding.decode_without_bom_handling(bytes).0.into_owned()
}

async fn stage_on(
    channel: &mut dyn RemoteChannel,
    remote_path: &str,
    contents: &[u8],
) -> Result<bool, SessionError> {
    if channel.file_exists(remote_path).await? {
        return Ok(false);
    }
    channel.upload(remote_path, contents).await?;
    Ok(true)
}

/// Runtime connection and status for one host profile
pub struct HostSession {
    profile: HostProfile,
    connector: Arc<dyn Connector>,
    settings: SessionSettings,
    channel: Option<Box<dyn RemoteChannel>>,
    last_status: HostStatus,
}

impl HostSession {
    pub fn new(profile: HostProfile, connector: Arc<dyn Connector>, settings: SessionSettings) -> Self {
        Self {
            profile,
            connector,
            settings,
            channel: None,
            last_status: HostStatus::Unknown,
        }
    }

    pub fn profile(&self) -> &HostProfile {
        &self.profile
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Status from the most recent explicit liveness check
    pub fn last_status(&self) -> HostStatus {
        self.last_status
    }

    pub fn set_status(&mut self, status: HostStatus) {
        self.last_status = status;
    }

    /// Open the remote-execution channel. No-op when one is already open.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.channel.is_some() {
            return Ok(());
        }

        tracing::debug!(
            host = %self.profile.host,
            port = self.profile.port,
            user = %self.profile.user,
            "Opening SSH channel"
        );
        let limit = self.settings.connect_timeout;
        let connecting = self
            .connector
            .connect(&self.profile, limit, self.settings.command_timeout);
        let opened = match timeout(limit, connecting).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Connection(format!(
                "{}:{} did not answer within {:?}",
                self.profile.host, self.profile.port, limit
            ))),
        };

        match opened {
            Ok(channel) => {
                self.channel = Some(channel);
                Ok(())
            }
            Err(e) => {
                tracing::error!(host = %self.profile.host, "Error connecting the SSH: {}", e);
                Err(e)
            }
        }
    }

    /// Release the channel if open
    pub fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close();
            tracing::debug!(host = %self.profile.host, "SSH channel closed");
        }
    }

    fn fault(&mut self, error: &SessionError) {
        tracing::warn!(
            host = %self.profile.host,
            "Dropping SSH channel after transport failure: {}",
            error
        );
        self.close();
    }

    async fn ensure_channel(
        &mut self,
    ) -> Result<&mut (dyn RemoteChannel + 'static), SessionError> {
        self.connect().await?;
        match self.channel.as_deref_mut() {
            Some(channel) => Ok(channel),
            None => Err(SessionError::Connection("channel not open".to_string())),
        }
    }

    /// Run `command` on the remote shell under the command timeout.
    ///
    /// Remote stderr becomes the error half of the result verbatim. Transport
    /// faults and timeouts yield empty output and fault the session.
    pub async fn exec_command(&mut self, command: &str) -> ActionResult {
        let limit = self.settings.command_timeout;
        let encoding = self.settings.encoding;

        let outcome = match self.ensure_channel().await {
            Ok(channel) => match timeout(limit, channel.exec(command)).await {
                Ok(result) => result,
                Err(_) => Err(SessionError::Timeout(limit)),
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(output) => {
                tracing::debug!(
                    host = %self.profile.host,
                    command,
                    exit_status = output.exit_status,
                    "Remote command finished"
                );
                ActionResult::new(decode(encoding, &output.stdout), decode(encoding, &output.stderr))
            }
            Err(e) => {
                tracing::error!(host = %self.profile.host, "Error executing command: {}", e);
                if e.faults_channel() {
                    self.fault(&e);
                }
                ActionResult::failed(e.to_string())
            }
        }
    }

    /// Liveness check: connect if needed, then run the probe command.
    ///
    /// Does not update [`last_status`](Self::last_status); the caller decides.
    pub async fn is_available(&mut self) -> bool {
        if self.connect().await.is_err() {
            return false;
        }
        let probe = self.exec_command(PROBE_COMMAND).await;
        if !probe.is_success() {
            tracing::error!(host = %self.profile.host, "Probe command failed: {}", probe.error);
        }
        probe.is_success()
    }

    /// Upload `script` into `remote_dir` unless it is already there.
    ///
    /// Returns whether an upload happened.
    pub async fn stage_helper_script(
        &mut self,
        script: &HelperScript,
        remote_dir: &str,
    ) -> Result<bool, SessionError> {
        let limit = self.settings.command_timeout;
        let remote_path = helper_remote_path(script, remote_dir);

        let channel = self.ensure_channel().await?;
        let staged = match timeout(
            limit,
            stage_on(channel, &remote_path, script.contents.as_bytes()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout(limit)),
        };

        match &staged {
            Ok(true) => tracing::info!(host = %self.profile.host, %remote_path, "Helper script uploaded"),
            Ok(false) => {
                tracing::debug!(host = %self.profile.host, %remote_path, "Helper script already present")
            }
            Err(e) if e.faults_channel() => self.fault(e),
            Err(_) => {}
        }
        staged
    }

    async fn run_staged(&mut self, script: &HelperScript) -> ActionResult {
        let remote_dir = self.settings.helper_dir.clone();
        match self.stage_helper_script(script, &remote_dir).await {
            Ok(_) => {}
            // The channel is gone; running now would mean a second connect.
            Err(e) if e.faults_channel() => return ActionResult::failed(e.to_string()),
            Err(e) => {
                // The exec below reports its own failure if the script is missing.
                tracing::error!(
                    host = %self.profile.host,
                    "Failed to stage {}: {}",
                    script.file_name,
                    e
                );
            }
        }
        let remote_path = helper_remote_path(script, &remote_dir);
        self.exec_command(&helper_exec_command(&remote_path)).await
    }

    /// Carry out one power action, with no retry.
    pub async fn run(&mut self, action: PowerAction) -> ActionResult {
        let result = match self.settings.command_set.plan(action) {
            ActionPlan::WakeOnLan => self.wake().await,
            ActionPlan::Exec(command) => self.exec_command(command).await,
            ActionPlan::StagedScript(script) => self.run_staged(script).await,
        };
        if result.is_success() {
            tracing::info!(
                host = %self.profile.host,
                %action,
                output = %result.output.trim(),
                "Power action initiated"
            );
        }
        result
    }

    /// Send a magic packet to the profile's MAC. Works without a channel.
    pub async fn wake(&self) -> ActionResult {
        let destination = self.settings.wake_target.destination(&self.profile.host);
        let error = self
            .settings
            .wake
            .dispatch(&self.profile.mac, Some(destination))
            .await;
        ActionResult::failed(error)
    }

    pub async fn sleep(&mut self) -> ActionResult {
        self.run(PowerAction::Sleep).await
    }

    pub async fn hibernate(&mut self) -> ActionResult {
        self.run(PowerAction::Hibernate).await
    }

    pub async fn shutdown(&mut self) -> ActionResult {
        self.run(PowerAction::Shutdown).await
    }

    pub async fn reboot(&mut self) -> ActionResult {
        self.run(PowerAction::Reboot).await
    }

    pub async fn lock(&mut self) -> ActionResult {
        self.run(PowerAction::Lock).await
    }

    /// Wrap this session so its channel is released when the guard drops
    pub fn scoped(self) -> SessionGuard {
        SessionGuard { session: self }
    }
}

/// Closes the wrapped session on every exit path
pub struct SessionGuard {
    session: HostSession,
}

impl Deref for SessionGuard {
    type Target = HostSession;

    fn deref(&self) -> &HostSession {
        &self.session
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut HostSession {
        &mut self.session
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.session.close();
    }
}
