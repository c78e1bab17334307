//! Server addressing.
//!
//! Both the chat socket and the liveness endpoint live on the same host and
//! port; only the scheme and path differ.

use std::fmt;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ROOM: &str = "default-room";

/// Where the chat server lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    room: String,
    secure: bool,
}

impl Endpoint {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        room: impl Into<String>,
        secure: bool,
    ) -> Result<Self, EndpointError> {
        let host = host.into();
        let room = room.into();

        if host.is_empty() || host.contains(['/', ' ', '?', '#']) {
            return Err(EndpointError::InvalidHost(host));
        }
        if room.is_empty() || room.contains(['/', ' ', '?', '#']) {
            return Err(EndpointError::InvalidRoom(room));
        }

        Ok(Self {
            host,
            port,
            room,
            secure,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// `ws[s]://host:port/ws/chat/room`
    pub fn websocket_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!(
            "{scheme}://{}:{}/ws/chat/{}",
            self.host, self.port, self.room
        )
    }

    /// `http[s]://host:port/status`
    pub fn status_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}:{}/status", self.host, self.port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            room: DEFAULT_ROOM.to_string(),
            secure: false,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} room {}", self.host, self.port, self.room)
    }
}

/// Error building an [`Endpoint`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid host: {0:?}")]
    InvalidHost(String),
    #[error("invalid room id: {0:?}")]
    InvalidRoom(String),
}
