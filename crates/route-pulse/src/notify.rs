//! Service status through the systemd notification protocol
//!
//! When run as a `Type=notify` unit, `$NOTIFY_SOCKET` names a datagram
//! socket that accepts `KEY=VALUE` lines. The routing service reports
//! `READY=1` and its status text there, which keeps it visible in
//! `systemctl status`. Outside systemd the status is only logged.

use std::env;
use std::path::PathBuf;

use inputroute_core::{ForegroundElevation, StatusText};

pub const NOTIFY_SOCKET_ENV: &str = "NOTIFY_SOCKET";

/// Format the status line sent to the supervisor.
pub fn status_message(status: &StatusText, first: bool) -> String {
    let line = format!("STATUS={}: {}", status.title, status.body.replace('\n', " "));
    if first {
        format!("READY=1\n{}", line)
    } else {
        line
    }
}

/// [`ForegroundElevation`] over `$NOTIFY_SOCKET`.
#[derive(Debug, Clone, Default)]
pub struct SystemdNotifier {
    socket: Option<PathBuf>,
    elevated: bool,
}

impl SystemdNotifier {
    /// Read the socket path from the environment.
    ///
    /// Abstract-namespace sockets (`@...`) are not supported and are ignored.
    pub fn from_env() -> Self {
        let socket = env::var_os(NOTIFY_SOCKET_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.to_string_lossy().starts_with('@'));
        Self {
            socket,
            elevated: false,
        }
    }

    pub fn with_socket(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: Some(socket.into()),
            elevated: false,
        }
    }

    fn notify(&self, message: &str) {
        let Some(socket) = &self.socket else {
            tracing::debug!(message, "Not supervised, status not sent");
            return;
        };
        if let Err(e) = send(socket, message) {
            tracing::warn!(socket = %socket.display(), error = %e, "Failed to notify supervisor");
        }
    }
}

#[cfg(unix)]
fn send(socket: &std::path::Path, message: &str) -> std::io::Result<()> {
    let datagram = std::os::unix::net::UnixDatagram::unbound()?;
    datagram.send_to(message.as_bytes(), socket)?;
    Ok(())
}

#[cfg(not(unix))]
fn send(_socket: &std::path::Path, _message: &str) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "notify socket requires unix",
    ))
}

impl ForegroundElevation for SystemdNotifier {
    fn elevate(&mut self, status: &StatusText) {
        tracing::info!(title = %status.title, "{}", status.body);
        let message = status_message(status, !self.elevated);
        self.notify(&message);
        self.elevated = true;
    }

    fn release(&mut self) {
        if !self.elevated {
            return;
        }
        self.notify("STOPPING=1\nSTATUS=Audio preference reverted to default");
        self.elevated = false;
    }
}
