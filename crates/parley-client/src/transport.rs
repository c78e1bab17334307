//! Chat transport.
//!
//! A transport runs each session in its own task and reports lifecycle and
//! inbound frames as [`SessionEvent`]s. Dropping the outbound sender closes
//! the session.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Identifies one connection attempt. Increases with every attempt.
pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Message(String),
    /// Advisory; a `Closed` always follows.
    Error(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: TransportEvent,
}

/// Opens chat sessions.
pub trait Transport {
    /// Start a session to `url`. Must not block; the outcome is reported on
    /// `events`, ending with exactly one `Closed`.
    fn open(
        &mut self,
        url: &str,
        session: SessionId,
        outbound: mpsc::UnboundedReceiver<String>,
        events: mpsc::UnboundedSender<SessionEvent>,
    );
}

/// WebSocket transport over tokio-tungstenite.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for WebSocketTransport {
    fn open(
        &mut self,
        url: &str,
        session: SessionId,
        outbound: mpsc::UnboundedReceiver<String>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) {
        tokio::spawn(run_session(url.to_string(), session, outbound, events));
    }
}

async fn run_session(
    url: String,
    session: SessionId,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let emit = |event: TransportEvent| {
        let _ = events.send(SessionEvent { session, event });
    };

    let ws = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            tracing::warn!("Connect to {} failed: {}", url, e);
            emit(TransportEvent::Error(e.to_string()));
            emit(TransportEvent::Closed);
            return;
        }
    };
    emit(TransportEvent::Open);

    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        emit(TransportEvent::Message(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!("Server closed session {}: {:?}", session, frame);
                        break;
                    }
                    // Pings are answered by tungstenite; binary frames are not part of the protocol.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error on session {}: {}", session, e);
                        emit(TransportEvent::Error(e.to_string()));
                        break;
                    }
                    None => break,
                }
            }

            frame = outbound.recv() => {
                match frame {
                    Some(text) => {
                        if let Err(e) = sink.send(Message::Text(text.into())).await {
                            emit(TransportEvent::Error(e.to_string()));
                            break;
                        }
                    }
                    None => {
                        // Owner dropped the session.
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
    }

    emit(TransportEvent::Closed);
}
