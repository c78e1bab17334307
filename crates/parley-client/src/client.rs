//! Composition root and event loop.

use parley_core::{ConnectionState, OutboundMessage, Severity};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::{ClientConfig, is_supported};
use crate::connection::ConnectionManager;
use crate::notify::{NotificationCenter, NotificationId, NotificationRenderer};
use crate::poller::{PollResult, StatusPoller};
use crate::probe::StatusProbe;
use crate::transport::{SessionEvent, Transport};
use crate::view::{ChatLine, ChatView};

/// Requests from the input side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Send a chat line in the current target language.
    Send(String),
    SetTargetLanguage(String),
    /// Manual status check; always reported.
    CheckStatus,
    Dismiss(NotificationId),
    StartPolling,
    StopPolling,
    Quit,
}

/// Result of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the session and echoed locally; the input can be cleared.
    Sent,
    /// Nothing but whitespace.
    Empty,
    /// Session is not open; nothing happened.
    NotConnected,
}

/// Whether the loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The chat application: one connection, one poller, one notification list.
pub struct ChatClient<T, P, V> {
    connection: ConnectionManager<T>,
    poller: StatusPoller<P>,
    notes: NotificationCenter,
    view: V,
    target_lang: String,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    results: mpsc::UnboundedReceiver<PollResult>,
    started: bool,
}

impl<T, P, V> ChatClient<T, P, V>
where
    T: Transport,
    P: StatusProbe,
    V: ChatView,
{
    pub fn new(
        config: &ClientConfig,
        transport: T,
        probe: P,
        view: V,
        renderer: Box<dyn NotificationRenderer>,
    ) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (results_tx, results) = mpsc::unbounded_channel();

        Self {
            connection: ConnectionManager::new(
                transport,
                config.endpoint.websocket_url(),
                config.reconnect_delay,
                events_tx,
            ),
            poller: StatusPoller::new(probe, config.poll_interval, results_tx),
            notes: NotificationCenter::with_ttl(renderer, config.notification_ttl),
            view,
            target_lang: config.target_lang.clone(),
            events,
            results,
            started: false,
        }
    }

    /// Open the connection and start status polling. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.connection.connect();
        self.poller.start();
    }

    /// Run until [`ClientCommand::Quit`] or the command channel closes, then
    /// shut down.
    pub async fn run(&mut self, mut commands: mpsc::UnboundedReceiver<ClientCommand>) {
        self.start();
        while self.turn(&mut commands).await == Flow::Continue {}
        self.shutdown();
    }

    /// Wait for the next thing to happen and handle it.
    pub async fn turn(&mut self, commands: &mut mpsc::UnboundedReceiver<ClientCommand>) -> Flow {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => return self.handle_command(command),
                None => return Flow::Quit,
            },
            Some(event) = self.events.recv() => {
                self.connection.handle_event(event, &mut self.view, &mut self.notes);
            }
            Some(result) = self.results.recv() => {
                self.poller.on_result(result, &mut self.notes);
            }
            () = self.connection.reconnect_due() => self.connection.fire_reconnect(),
            () = self.poller.tick() => self.poller.check_once(false, &mut self.notes),
            () = self.notes.expiry_due() => {
                self.notes.expire(Instant::now());
            }
        }
        Flow::Continue
    }

    pub fn handle_command(&mut self, command: ClientCommand) -> Flow {
        match command {
            ClientCommand::Send(text) => {
                self.send(&text);
            }
            ClientCommand::SetTargetLanguage(lang) => self.set_target_lang(lang),
            ClientCommand::CheckStatus => self.check_now(),
            ClientCommand::Dismiss(id) => {
                self.notes.dismiss(id);
            }
            ClientCommand::StartPolling => self.poller.start(),
            ClientCommand::StopPolling => self.poller.stop(),
            ClientCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Send a chat line and echo it locally.
    pub fn send(&mut self, input: &str) -> SendOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SendOutcome::Empty;
        }
        if self.connection.state() != ConnectionState::Open {
            return SendOutcome::NotConnected;
        }

        let message = OutboundMessage::new(text, self.target_lang.as_str());
        if !self.connection.send(&message) {
            return SendOutcome::NotConnected;
        }
        self.view.line(ChatLine::Sent(message.text));
        SendOutcome::Sent
    }

    /// Check server status now, reporting the result even if unchanged.
    pub fn check_now(&mut self) {
        self.poller.check_once(true, &mut self.notes);
    }

    pub fn set_target_lang(&mut self, lang: String) {
        if !is_supported(&lang) {
            tracing::warn!("Target language {:?} may not be supported", lang);
            self.notes.show(
                Severity::Warning,
                format!("Language '{lang}' may not be supported by the server"),
            );
        }
        tracing::info!("Target language set to {}", lang);
        self.target_lang = lang;
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// Stop polling and close the connection without reconnecting.
    pub fn shutdown(&mut self) {
        self.poller.stop();
        self.connection.shutdown();
        tracing::info!("Client stopped");
    }

    pub fn connection(&self) -> &ConnectionManager<T> {
        &self.connection
    }

    pub fn poller(&self) -> &StatusPoller<P> {
        &self.poller
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notes
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}
