//! Client-side runtime for Parley.
//!
//! [`ChatClient`] owns three components and drives them from one event loop:
//!
//! - [`ConnectionManager`]: the WebSocket session, reconnecting on close
//! - [`StatusPoller`]: periodic `GET /status` with change detection
//! - [`NotificationCenter`]: expiring, dismissible alerts
//!
//! I/O happens in spawned tasks that report back over channels, so all state
//! is mutated from the loop alone.

mod client;
mod config;
mod connection;
mod notify;
mod poller;
mod probe;
mod transport;
mod view;

pub use client::{ChatClient, ClientCommand, Flow, SendOutcome};
pub use config::{
    ClientConfig, DEFAULT_TARGET_LANG, NOTIFICATION_TTL, POLL_INTERVAL, RECONNECT_DELAY,
    SUPPORTED_LANGUAGES,
};
pub use connection::ConnectionManager;
pub use notify::{Notification, NotificationCenter, NotificationId, NotificationRenderer};
pub use poller::{PollResult, StatusPoller};
pub use probe::{HttpProbe, ProbeError, StatusProbe};
pub use transport::{SessionEvent, SessionId, Transport, TransportEvent, WebSocketTransport};
pub use view::{ChatLine, ChatView};

pub use parley_core::{
    ConnectionState, Endpoint, InboundMessage, OutboundMessage, Severity, StatusSnapshot,
};
