//! Core types for Parley.
//!
//! This crate provides the wire protocol spoken with the chat server and the
//! liveness endpoint. It has no I/O; the client crate drives it.

mod endpoint;
mod message;
mod status;

pub use endpoint::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_ROOM, Endpoint, EndpointError};
pub use message::{InboundMessage, OutboundMessage, ProtocolError};
pub use status::{Severity, StatusSnapshot};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Handshake in progress.
    #[default]
    Connecting,
    /// Session established, frames may be sent.
    Open,
    /// Session gone. A reconnect may be pending.
    Closed,
}

impl ConnectionState {
    /// Whether outbound frames are accepted in this state.
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}
