//! Remote-execution channel over SSH
//!
//! Windows OpenSSH Server with password authentication. libssh2 is
//! blocking, so every call runs on the blocking pool; the Host Session
//! bounds each call with its own timeout on top of the libssh2 one.

use crate::core::transport::{CommandOutput, Connector, RemoteChannel};
use crate::models::HostProfile;
use crate::utils::SessionError;
use async_trait::async_trait;
use ssh2::{ErrorCode, Session};
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const LIBSSH2_ERROR_TIMEOUT: i32 = -9;
const LIBSSH2_FX_NO_SUCH_FILE: i32 = 2;

fn timeout_millis(limit: Duration) -> u32 {
    u32::try_from(limit.as_millis()).unwrap_or(u32::MAX)
}

fn is_timeout(err: &ssh2::Error) -> bool {
    matches!(err.code(), ErrorCode::Session(code) if code == LIBSSH2_ERROR_TIMEOUT)
}

fn transport_error(context: &str, err: ssh2::Error, limit: Duration) -> SessionError {
    if is_timeout(&err) {
        SessionError::Timeout(limit)
    } else {
        SessionError::Transport(format!("{}: {}", context, err))
    }
}

/// libssh2 surfaces its session timeout through `Read`/`Write` as
/// `TimedOut`, or as `WouldBlock` when the socket timeout fires first.
fn is_io_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

fn read_error(context: &str, err: io::Error, limit: Duration) -> SessionError {
    if is_io_timeout(&err) {
        SessionError::Timeout(limit)
    } else {
        SessionError::Transport(format!("{}: {}", context, err))
    }
}

fn transfer_error(context: &str, err: ssh2::Error, limit: Duration) -> SessionError {
    if is_timeout(&err) {
        SessionError::Timeout(limit)
    } else {
        SessionError::Transfer(format!("{}: {}", context, err))
    }
}

/// Opens password-authenticated SSH channels
///
/// Host keys are not checked against `known_hosts`: any key the server
/// presents is accepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct SshConnector;

impl SshConnector {
    pub fn new() -> Self {
        SshConnector
    }
}

fn open_session(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    limit: Duration,
    command_limit: Duration,
) -> Result<Session, SessionError> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| SessionError::Connection(format!("could not resolve {}: {}", host, e)))?;

    let mut last_error = None;
    let tcp = addrs
        .into_iter()
        .find_map(|addr| match TcpStream::connect_timeout(&addr, limit) {
            Ok(stream) => Some(stream),
            Err(e) => {
                last_error = Some(e);
                None
            }
        })
        .ok_or_else(|| {
            SessionError::Connection(match &last_error {
                Some(e) => format!("SSH connect to {}:{} failed: {}", host, port, e),
                None => format!("{} resolved to no addresses", host),
            })
        })?;
    tcp.set_read_timeout(Some(limit)).ok();
    tcp.set_write_timeout(Some(limit)).ok();
    let socket = tcp.try_clone().ok();

    let mut sess =
        Session::new().map_err(|e| SessionError::Connection(format!("SSH session init failed: {}", e)))?;
    sess.set_tcp_stream(tcp);
    sess.set_timeout(timeout_millis(limit));
    sess.handshake()
        .map_err(|e| SessionError::Connection(format!("SSH handshake failed: {}", e)))?;

    // SECURITY: report the user name only.
    sess.userauth_password(user, password)
        .map_err(|_| SessionError::Authentication(user.to_string()))?;
    if !sess.authenticated() {
        return Err(SessionError::Authentication(user.to_string()));
    }

    // From here on every call is bounded by the command timeout.
    if let Some(socket) = socket {
        socket.set_read_timeout(Some(command_limit)).ok();
        socket.set_write_timeout(Some(command_limit)).ok();
    }
    sess.set_timeout(timeout_millis(command_limit));
    Ok(sess)
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(
        &self,
        profile: &HostProfile,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Box<dyn RemoteChannel>, SessionError> {
        let host = profile.host.trim().to_string();
        let port = profile.port;
        let user = profile.user.clone();
        let password = profile.password.clone();

        let server_name = format!("{}:{}", host, port);
        let session = tokio::task::spawn_blocking(move || {
            open_session(
                &host,
                port,
                &user,
                password.as_str(),
                connect_timeout,
                command_timeout,
            )
        })
        .await
        .map_err(|e| SessionError::Connection(format!("SSH task failed: {}", e)))??;

        tracing::debug!(server = %server_name, "SSH channel established");
        Ok(Box::new(SshChannel {
            server_name,
            session: Arc::new(Mutex::new(session)),
            timeout: command_timeout,
            closed: false,
        }))
    }
}

pub struct SshChannel {
    server_name: String,
    session: Arc<Mutex<Session>>,
    timeout: Duration,
    closed: bool,
}

impl SshChannel {
    /// Run `op` against the locked session on the blocking pool
    async fn blocking<T, F>(&self, op: F) -> Result<T, SessionError>
    where
        T: Send + 'static,
        F: FnOnce(&Session, Duration) -> Result<T, SessionError> + Send + 'static,
    {
        let session = self.session.clone();
        let limit = self.timeout;
        tokio::task::spawn_blocking(move || {
            let sess = session
                .lock()
                .map_err(|_| SessionError::Transport("SSH session lock poisoned".to_string()))?;
            op(&sess, limit)
        })
        .await
        .map_err(|e| SessionError::Transport(format!("SSH task failed: {}", e)))?
    }
}

#[async_trait]
impl RemoteChannel for SshChannel {
    async fn exec(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        if self.closed {
            return Err(SessionError::Transport(format!(
                "channel to {} is closed",
                self.server_name
            )));
        }
        let command = command.to_string();
        self.blocking(move |sess, limit| {
            let mut channel = sess
                .channel_session()
                .map_err(|e| transport_error("SSH channel open failed", e, limit))?;
            channel
                .exec(&command)
                .map_err(|e| transport_error("SSH exec failed", e, limit))?;

            let mut stdout = Vec::new();
            channel
                .read_to_end(&mut stdout)
                .map_err(|e| read_error("SSH read failed", e, limit))?;
            let mut stderr = Vec::new();
            channel
                .stderr()
                .read_to_end(&mut stderr)
                .map_err(|e| read_error("SSH stderr read failed", e, limit))?;

            channel.wait_close().ok();
            let exit_status = channel.exit_status().unwrap_or(-1);
            Ok(CommandOutput {
                stdout,
                stderr,
                exit_status,
            })
        })
        .await
    }

    async fn file_exists(&mut self, remote_path: &str) -> Result<bool, SessionError> {
        let remote_path = remote_path.to_string();
        self.blocking(move |sess, limit| {
            let sftp = sess
                .sftp()
                .map_err(|e| transfer_error("SFTP subsystem unavailable", e, limit))?;
            match sftp.stat(Path::new(&remote_path)) {
                Ok(_) => Ok(true),
                Err(e) if matches!(e.code(), ErrorCode::SFTP(LIBSSH2_FX_NO_SUCH_FILE)) => Ok(false),
                Err(e) => Err(transfer_error(&format!("stat {}", remote_path), e, limit)),
            }
        })
        .await
    }

    async fn upload(&mut self, remote_path: &str, contents: &[u8]) -> Result<(), SessionError> {
        let remote_path = remote_path.to_string();
        let contents = contents.to_vec();
        self.blocking(move |sess, limit| {
            let sftp = sess
                .sftp()
                .map_err(|e| transfer_error("SFTP subsystem unavailable", e, limit))?;
            let mut file = sftp
                .create(Path::new(&remote_path))
                .map_err(|e| transfer_error(&format!("create {}", remote_path), e, limit))?;
            file.write_all(&contents)
                .map_err(|e| {
                    if is_io_timeout(&e) {
                        SessionError::Timeout(limit)
                    } else {
                        SessionError::Transfer(format!("write {}: {}", remote_path, e))
                    }
                })?;
            Ok(())
        })
        .await
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // A call abandoned on timeout may still hold the lock; dropping the
        // last Arc tears the connection down once it returns.
        if let Ok(sess) = self.session.try_lock() {
            let _ = sess.disconnect(None, "winturn session closed", None);
        }
    }
}

impl Drop for SshChannel {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SecureString;

    #[test]
    fn stalled_reads_are_classified_as_timeouts() {
        let limit = Duration::from_secs(30);
        for kind in [io::ErrorKind::TimedOut, io::ErrorKind::WouldBlock] {
            let err = read_error("SSH read failed", io::Error::from(kind), limit);
            assert!(matches!(err, SessionError::Timeout(d) if d == limit));
            assert!(err.faults_channel());
        }

        let err = read_error("SSH read failed", io::Error::from(io::ErrorKind::ConnectionReset), limit);
        assert!(matches!(err, SessionError::Transport(msg) if msg.starts_with("SSH read failed")));
    }

    #[test]
    fn timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_secs(30)), 30_000);
        assert_eq!(timeout_millis(Duration::from_secs(u64::MAX / 1000)), u32::MAX);
    }

    #[tokio::test]
    async fn connect_to_closed_port_is_a_connection_error() {
        // Bind then drop to get a local port with nothing listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let profile = HostProfile::new("127.0.0.1", "AA:BB:CC:DD:EE:FF", "u", SecureString::new("p"))
            .with_port(port);

        let result = SshConnector::new()
            .connect(&profile, Duration::from_secs(2), Duration::from_secs(30))
            .await;

        match result {
            Err(SessionError::Connection(msg)) => assert!(msg.contains("SSH connect to 127.0.0.1")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
