//! Action dispatch policy
//!
//! Turns one user request into one scoped Host Session, runs the action in
//! the mode the action calls for, and produces the message the front-end
//! shows verbatim. The session is closed on every exit path.

use crate::constants::{ASLEEP_MESSAGE, COMPLETED_MESSAGE, UNAVAILABLE_MESSAGE};
use crate::core::commands::{DispatchMode, PowerAction};
use crate::core::session::{HostSession, SessionGuard, SessionSettings};
use crate::core::transport::Connector;
use crate::models::{ActionResult, HostProfile, HostStatus};
use std::sync::Arc;

/// What the front-end needs to render after one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub action: PowerAction,
    /// Liveness observed on the way, `None` in offline mode
    pub status: Option<HostStatus>,
    pub result: ActionResult,
    /// User-facing text: `Completed.`, an unavailability notice, or the
    /// action's error verbatim
    pub message: String,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    fn finished(action: PowerAction, status: Option<HostStatus>, result: ActionResult) -> Self {
        let message = if result.is_success() {
            COMPLETED_MESSAGE.to_string()
        } else {
            result.error.clone()
        };
        Self {
            action,
            status,
            result,
            message,
        }
    }

    fn unavailable(action: PowerAction, message: &str) -> Self {
        Self {
            action,
            status: Some(HostStatus::Unavailable),
            result: ActionResult::failed(message),
            message: message.to_string(),
        }
    }
}

/// Runs power actions against hosts, one scoped session per call
pub struct Dispatcher {
    connector: Arc<dyn Connector>,
    settings: SessionSettings,
}

impl Dispatcher {
    pub fn new(connector: Arc<dyn Connector>, settings: SessionSettings) -> Self {
        Self {
            connector,
            settings,
        }
    }

    fn open(&self, profile: &HostProfile) -> SessionGuard {
        HostSession::new(profile.clone(), self.connector.clone(), self.settings.clone()).scoped()
    }

    /// Run `action` in the mode it requires
    pub async fn dispatch(&self, profile: &HostProfile, action: PowerAction) -> DispatchOutcome {
        match action.mode() {
            DispatchMode::Offline => self.run_offline(profile, action).await,
            DispatchMode::Online => self.run_online(profile, action).await,
        }
    }

    /// Run without establishing or verifying connectivity first
    pub async fn run_offline(&self, profile: &HostProfile, action: PowerAction) -> DispatchOutcome {
        let mut session = self.open(profile);
        let result = session.run(action).await;
        DispatchOutcome::finished(action, None, result)
    }

    /// Connect, probe, and only then run the action
    pub async fn run_online(&self, profile: &HostProfile, action: PowerAction) -> DispatchOutcome {
        let mut session = self.open(profile);

        if let Err(e) = session.connect().await {
            tracing::warn!(host = %profile.host, %action, "Skipping action, host unreachable: {}", e);
            return DispatchOutcome::unavailable(action, UNAVAILABLE_MESSAGE);
        }
        if !session.is_available().await {
            tracing::warn!(host = %profile.host, %action, "Skipping action, probe failed");
            return DispatchOutcome::unavailable(action, ASLEEP_MESSAGE);
        }

        session.set_status(HostStatus::Available);
        let result = session.run(action).await;
        DispatchOutcome::finished(action, Some(session.last_status()), result)
    }

    /// Connect and probe only ("Test connection")
    pub async fn check_status(&self, profile: &HostProfile) -> HostStatus {
        let mut session = self.open(profile);
        let status = if session.is_available().await {
            HostStatus::Available
        } else {
            HostStatus::Unavailable
        };
        session.set_status(status);
        tracing::info!(host = %profile.host, %status, "Connection test finished");
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PROBE_COMMAND;
    use crate::core::mock_transport::{MockConnector, MockHost};
    use crate::core::wake::{WakeDispatcher, WakeTarget};
    use crate::models::SecureString;
    use tokio::net::UdpSocket;

    fn profile() -> HostProfile {
        HostProfile::new("10.0.0.5", "AA:BB:CC:DD:EE:FF", "u", SecureString::new("p"))
    }

    fn dispatcher(connector: &Arc<MockConnector>) -> Dispatcher {
        Dispatcher::new(connector.clone(), SessionSettings::default())
    }

    #[tokio::test]
    async fn wake_then_unreachable_shutdown_reports_pc_unavailable() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = receiver.local_addr().unwrap().port();
        let connector = Arc::new(MockConnector::new(MockHost::Unreachable));
        let settings = SessionSettings {
            wake_target: WakeTarget::Address("127.0.0.1".to_string()),
            wake: WakeDispatcher::new(port),
            ..SessionSettings::default()
        };
        let dispatcher = Dispatcher::new(connector.clone(), settings);

        let woke = dispatcher.dispatch(&profile(), PowerAction::Wake).await;
        assert_eq!(woke.result.error, "");
        assert_eq!(woke.status, None);

        let outcome = dispatcher.dispatch(&profile(), PowerAction::Shutdown).await;
        assert_eq!(outcome.status, Some(HostStatus::Unavailable));
        assert_eq!(outcome.message, "PC unavailable");
        assert!(connector.snapshot().commands.is_empty());
    }

    #[tokio::test]
    async fn shutdown_on_live_host_completes() {
        let connector = Arc::new(MockConnector::new(MockHost::Healthy));

        let outcome = dispatcher(&connector)
            .dispatch(&profile(), PowerAction::Shutdown)
            .await;

        assert_eq!(outcome.result.error, "");
        assert_eq!(outcome.message, "Completed.");
        assert_eq!(outcome.status, Some(HostStatus::Available));
        assert_eq!(
            connector.snapshot().commands,
            vec![
                PROBE_COMMAND.to_string(),
                "Shutdown.exe -sg -f -d p:2:4".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn failed_probe_reports_already_asleep_without_running_action() {
        let connector = Arc::new(MockConnector::new(MockHost::ProbeFails));

        let outcome = dispatcher(&connector)
            .dispatch(&profile(), PowerAction::Hibernate)
            .await;

        assert_eq!(outcome.status, Some(HostStatus::Unavailable));
        assert_eq!(outcome.message, "PC is already asleep or off");
        assert_eq!(connector.snapshot().commands, vec![PROBE_COMMAND.to_string()]);
    }

    #[tokio::test]
    async fn action_error_is_shown_verbatim() {
        let connector = Arc::new(MockConnector::new(MockHost::Healthy).with_response(
            "Shutdown.exe -r -g -f",
            b"",
            b"A system shutdown is in progress.(1115)",
        ));

        let outcome = dispatcher(&connector)
            .dispatch(&profile(), PowerAction::Reboot)
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.message, "A system shutdown is in progress.(1115)");
    }

    #[tokio::test]
    async fn every_dispatch_releases_its_channel() {
        let connector = Arc::new(MockConnector::new(MockHost::Healthy));
        let dispatcher = dispatcher(&connector);

        dispatcher.dispatch(&profile(), PowerAction::Lock).await;
        dispatcher.dispatch(&profile(), PowerAction::Sleep).await;
        dispatcher.check_status(&profile()).await;

        let log = connector.snapshot();
        assert_eq!(log.connects, 3);
        assert_eq!(log.closes, 3);
    }

    #[tokio::test]
    async fn check_status_maps_probe_to_status() {
        let healthy = Arc::new(MockConnector::new(MockHost::Healthy));
        assert_eq!(
            dispatcher(&healthy).check_status(&profile()).await,
            HostStatus::Available
        );

        let asleep = Arc::new(MockConnector::new(MockHost::ProbeFails));
        assert_eq!(
            dispatcher(&asleep).check_status(&profile()).await,
            HostStatus::Unavailable
        );

        let unreachable = Arc::new(MockConnector::new(MockHost::Unreachable));
        assert_eq!(
            dispatcher(&unreachable).check_status(&profile()).await,
            HostStatus::Unavailable
        );
    }

    #[tokio::test]
    async fn offline_mode_never_probes() {
        let connector = Arc::new(MockConnector::new(MockHost::Healthy));

        let outcome = dispatcher(&connector)
            .run_offline(&profile(), PowerAction::Lock)
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.status, None);
        assert_eq!(
            connector.snapshot().commands,
            vec!["rundll32.exe user32.dll,LockWorkStation".to_string()]
        );
    }
}
