//! Self-healing chat session.
//!
//! ```text
//! Connecting --open--> Open --close--> Closed --delay--> Connecting ...
//!                      Open --error--> Open
//! ```
//!
//! There is no terminal state: a closed session is reopened after a fixed
//! delay for as long as the manager lives.

use parley_core::{ConnectionState, InboundMessage, OutboundMessage, Severity};
use std::future::pending;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::notify::NotificationCenter;
use crate::transport::{SessionEvent, SessionId, Transport, TransportEvent};
use crate::view::{ChatLine, ChatView};

const CONNECTED: &str = "Connected to chat server";
const DISCONNECTED: &str = "Disconnected from chat server";
const MALFORMED: &str = "Received malformed message from server";

struct Session {
    id: SessionId,
    outbound: mpsc::UnboundedSender<String>,
}

/// Owns the chat connection: its state, the active session and the pending reconnect.
pub struct ConnectionManager<T> {
    transport: T,
    url: String,
    reconnect_delay: Duration,
    state: ConnectionState,
    session: Option<Session>,
    next_session: SessionId,
    pending_reconnect: Option<Instant>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(
        transport: T,
        url: impl Into<String>,
        reconnect_delay: Duration,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            transport,
            url: url.into(),
            reconnect_delay,
            state: ConnectionState::Connecting,
            session: None,
            next_session: 0,
            pending_reconnect: None,
            events,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// When the next attempt will start, if one is scheduled.
    pub fn reconnect_at(&self) -> Option<Instant> {
        self.pending_reconnect
    }

    /// Open a new session, replacing any current one.
    ///
    /// Only called at startup and when a scheduled reconnect fires.
    pub fn connect(&mut self) {
        self.pending_reconnect = None;

        let id = self.next_session;
        self.next_session += 1;

        tracing::info!("Connecting to {} (session {})", self.url, id);
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        self.transport
            .open(&self.url, id, outbound_rx, self.events.clone());

        self.session = Some(Session { id, outbound });
        self.state = ConnectionState::Connecting;
    }

    /// Resolves when the scheduled reconnect is due; never if none is.
    pub async fn reconnect_due(&self) {
        match self.pending_reconnect {
            Some(at) => sleep_until(at).await,
            None => pending().await,
        }
    }

    /// Start the scheduled attempt, if there is one.
    pub fn fire_reconnect(&mut self) {
        if self.pending_reconnect.take().is_some() {
            self.connect();
        }
    }

    /// Send a chat line. Dropped unless the session is open.
    pub fn send(&mut self, message: &OutboundMessage) -> bool {
        if !self.state.is_open() {
            tracing::debug!("Dropping outbound message while {:?}", self.state);
            return false;
        }
        let Some(session) = &self.session else {
            return false;
        };

        let frame = match message.to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Could not encode outbound message: {}", e);
                return false;
            }
        };
        // A send error means the session task is ending; its Closed event follows.
        session.outbound.send(frame).is_ok()
    }

    /// Apply one event from the transport.
    pub fn handle_event(
        &mut self,
        event: SessionEvent,
        view: &mut dyn ChatView,
        notes: &mut NotificationCenter,
    ) {
        if self.session.as_ref().map(|s| s.id) != Some(event.session) {
            tracing::debug!("Ignoring {:?} from stale session {}", event.event, event.session);
            return;
        }

        match event.event {
            TransportEvent::Open => {
                tracing::info!("Session {} open", event.session);
                self.state = ConnectionState::Open;
                self.pending_reconnect = None;
                view.line(ChatLine::System(CONNECTED.to_string()));
                notes.show(Severity::Success, CONNECTED);
            }
            TransportEvent::Message(raw) => self.on_message(&raw, view, notes),
            TransportEvent::Error(reason) => {
                tracing::warn!("Session {} error: {}", event.session, reason);
                view.line(ChatLine::System("Connection error occurred".to_string()));
                notes.show(Severity::Error, "WebSocket connection error");
            }
            TransportEvent::Closed => self.on_close(view, notes),
        }
    }

    fn on_message(&mut self, raw: &str, view: &mut dyn ChatView, notes: &mut NotificationCenter) {
        let message = match InboundMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Invalid message: {}", e);
                notes.show(Severity::Warning, MALFORMED);
                return;
            }
        };

        match message {
            InboundMessage::System { message } => view.line(ChatLine::System(message)),
            InboundMessage::Status { message } => {
                notes.show(Severity::Info, message.clone());
                view.line(ChatLine::Status(message));
            }
            InboundMessage::ChatResult {
                text,
                translation_text,
            } => view.line(ChatLine::Received {
                text,
                translation: translation_text,
            }),
            InboundMessage::ServerError { message } => {
                tracing::warn!("Server error: {}", message);
                notes.show(Severity::Error, message);
            }
        }
    }

    fn on_close(&mut self, view: &mut dyn ChatView, notes: &mut NotificationCenter) {
        self.session = None;
        self.state = ConnectionState::Closed;
        view.line(ChatLine::System(DISCONNECTED.to_string()));
        notes.show(Severity::Error, DISCONNECTED);

        if self.pending_reconnect.is_none() {
            let at = Instant::now() + self.reconnect_delay;
            tracing::info!("Reconnecting in {:?}", self.reconnect_delay);
            self.pending_reconnect = Some(at);
        }
    }

    /// Close the session for good: no reconnect is scheduled afterwards.
    pub fn shutdown(&mut self) {
        self.pending_reconnect = None;
        if self.session.take().is_some() {
            tracing::info!("Closing connection to {}", self.url);
        }
        self.state = ConnectionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RECONNECT_DELAY;

    #[derive(Default)]
    struct Recorder {
        opened: Vec<(SessionId, mpsc::UnboundedReceiver<String>)>,
    }

    impl Transport for Recorder {
        fn open(
            &mut self,
            _url: &str,
            session: SessionId,
            outbound: mpsc::UnboundedReceiver<String>,
            _events: mpsc::UnboundedSender<SessionEvent>,
        ) {
            self.opened.push((session, outbound));
        }
    }

    struct Harness {
        manager: ConnectionManager<Recorder>,
        view: Vec<ChatLine>,
        notes: NotificationCenter,
        _events: mpsc::UnboundedReceiver<SessionEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            Self {
                manager: ConnectionManager::new(
                    Recorder::default(),
                    "ws://localhost:8000/ws/chat/default-room",
                    RECONNECT_DELAY,
                    tx,
                ),
                view: Vec::new(),
                notes: NotificationCenter::new(Box::new(())),
                _events: rx,
            }
        }

        fn event(&mut self, session: SessionId, event: TransportEvent) {
            self.manager.handle_event(
                SessionEvent { session, event },
                &mut self.view,
                &mut self.notes,
            );
        }

        fn severities(&self) -> Vec<Severity> {
            self.notes.visible().iter().map(|n| n.severity).collect()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn open_then_close_schedules_reconnect() {
        let mut h = Harness::new();
        h.manager.connect();
        assert_eq!(h.manager.state(), ConnectionState::Connecting);

        h.event(0, TransportEvent::Open);
        assert_eq!(h.manager.state(), ConnectionState::Open);
        assert_eq!(h.view, [ChatLine::System(CONNECTED.into())]);

        h.event(0, TransportEvent::Closed);
        assert_eq!(h.manager.state(), ConnectionState::Closed);
        assert_eq!(h.view[1], ChatLine::System(DISCONNECTED.into()));
        assert_eq!(h.severities(), [Severity::Success, Severity::Error]);
        assert_eq!(
            h.manager.reconnect_at(),
            Some(Instant::now() + RECONNECT_DELAY)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_close_keeps_one_pending_attempt() {
        let mut h = Harness::new();
        h.manager.connect();
        h.event(0, TransportEvent::Closed);
        let first = h.manager.reconnect_at();

        tokio::time::advance(Duration::from_secs(2)).await;
        h.event(0, TransportEvent::Closed);
        assert_eq!(h.manager.reconnect_at(), first);
        assert_eq!(h.notes.visible().len(), 1);

        h.manager.reconnect_due().await;
        h.manager.fire_reconnect();
        h.manager.fire_reconnect();
        assert_eq!(h.manager.transport.opened.len(), 2);
        assert_eq!(h.manager.state(), ConnectionState::Connecting);
        assert_eq!(h.manager.reconnect_at(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn error_is_advisory() {
        let mut h = Harness::new();
        h.manager.connect();
        h.event(0, TransportEvent::Open);
        h.event(0, TransportEvent::Error("reset".into()));

        assert_eq!(h.manager.state(), ConnectionState::Open);
        assert_eq!(h.manager.reconnect_at(), None);
        assert_eq!(h.severities(), [Severity::Success, Severity::Error]);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_session_events_are_ignored() {
        let mut h = Harness::new();
        h.manager.connect();
        h.event(0, TransportEvent::Closed);
        h.manager.fire_reconnect();

        h.event(0, TransportEvent::Open);
        assert_eq!(h.manager.state(), ConnectionState::Connecting);
        h.event(1, TransportEvent::Open);
        assert_eq!(h.manager.state(), ConnectionState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn routes_inbound_frames() {
        let mut h = Harness::new();
        h.manager.connect();
        h.event(0, TransportEvent::Open);
        h.view.clear();

        h.event(
            0,
            TransportEvent::Message(r#"{"type":"system","message":"hi all"}"#.into()),
        );
        h.event(
            0,
            TransportEvent::Message(r#"{"type":"status","message":"Translation Started."}"#.into()),
        );
        h.event(
            0,
            TransportEvent::Message(r#"{"text":"hello","translation_text":"hola"}"#.into()),
        );

        assert_eq!(
            h.view,
            [
                ChatLine::System("hi all".into()),
                ChatLine::Status("Translation Started.".into()),
                ChatLine::Received {
                    text: "hello".into(),
                    translation: Some("hola".into())
                },
            ]
        );
        let last = h.notes.visible().last().unwrap();
        assert_eq!(last.severity, Severity::Info);
        assert_eq!(last.message, "Translation Started.");
    }

    #[tokio::test(start_paused = true)]
    async fn status_frames_always_notify() {
        let mut h = Harness::new();
        h.manager.connect();
        let frame = r#"{"type":"status","message":"Translation Completed."}"#;
        h.event(0, TransportEvent::Message(frame.into()));
        h.event(0, TransportEvent::Message(frame.into()));
        assert_eq!(h.notes.visible().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_and_error_frames_notify_only() {
        let mut h = Harness::new();
        h.manager.connect();
        h.event(0, TransportEvent::Message("{oops".into()));
        h.event(
            0,
            TransportEvent::Message(r#"{"error":"No translation response available."}"#.into()),
        );

        assert!(h.view.is_empty());
        assert_eq!(h.severities(), [Severity::Warning, Severity::Error]);
        assert_eq!(h.notes.visible()[0].message, MALFORMED);
    }

    #[tokio::test(start_paused = true)]
    async fn send_requires_open_session() {
        let mut h = Harness::new();
        let message = OutboundMessage::new("hello", "fr");

        h.manager.connect();
        assert!(!h.manager.send(&message));

        h.event(0, TransportEvent::Open);
        assert!(h.manager.send(&message));
        let frame = h.manager.transport.opened[0].1.try_recv().unwrap();
        assert_eq!(frame, r#"{"text":"hello","target_lang":"fr"}"#);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_reconnect() {
        let mut h = Harness::new();
        h.manager.connect();
        h.event(0, TransportEvent::Closed);
        h.manager.shutdown();

        assert_eq!(h.manager.reconnect_at(), None);
        let due = tokio::time::timeout(Duration::from_secs(60), h.manager.reconnect_due()).await;
        assert!(due.is_err());
    }
}
