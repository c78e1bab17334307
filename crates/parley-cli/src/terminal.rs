//! Line-oriented terminal view and input parsing.

use parley_client::{
    ChatLine, ChatView, ClientCommand, Notification, NotificationId, NotificationRenderer,
    Severity,
};
use std::io::Write;

pub const HELP: &str = "\
Type a message and press Enter to send it.
  /lang <code>     translate into <code> (en, es, fr)
  /status          check server status now
  /dismiss <id>    hide a notification
  /stop, /start    pause or resume automatic status checks
  /quit            leave";

/// Prints chat lines to stdout.
#[derive(Debug, Default)]
pub struct TerminalView;

impl ChatView for TerminalView {
    fn line(&mut self, line: ChatLine) {
        let mut out = std::io::stdout().lock();
        let _ = match line {
            ChatLine::System(text) => writeln!(out, "-- {text}"),
            ChatLine::Status(text) => writeln!(out, "~~ {text}"),
            ChatLine::Sent(text) => writeln!(out, "> {text}"),
            ChatLine::Received { text, translation } => match translation {
                Some(translation) => writeln!(out, "< {text}\n    {translation}"),
                None => writeln!(out, "< {text}"),
            },
        };
    }
}

/// Prints notifications to stdout as they appear.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl NotificationRenderer for TerminalNotifier {
    fn shown(&mut self, notification: &Notification) {
        let _ = writeln!(
            std::io::stdout().lock(),
            "[{}] {}  (#{})",
            icon(notification.severity),
            notification.message,
            notification.id
        );
    }

    fn removed(&mut self, id: NotificationId) {
        tracing::trace!("Notification {} removed", id);
    }
}

fn icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "✓",
        Severity::Error => "✕",
        Severity::Info => "ℹ",
        Severity::Warning => "!",
    }
}

/// What a line of user input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(ClientCommand),
    Help,
    Invalid(String),
}

pub fn parse_input(line: &str) -> Input {
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Input::Command(ClientCommand::Send(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest.trim(), ""),
    };

    match (name, arg) {
        ("lang", "") => Input::Invalid("usage: /lang <code>".into()),
        ("lang", lang) => Input::Command(ClientCommand::SetTargetLanguage(lang.to_string())),
        ("status", _) => Input::Command(ClientCommand::CheckStatus),
        ("dismiss", id) => match id.parse::<u64>() {
            Ok(id) => Input::Command(ClientCommand::Dismiss(NotificationId::new(id))),
            Err(_) => Input::Invalid("usage: /dismiss <id>".into()),
        },
        ("stop", _) => Input::Command(ClientCommand::StopPolling),
        ("start", _) => Input::Command(ClientCommand::StartPolling),
        ("quit" | "exit", _) => Input::Command(ClientCommand::Quit),
        ("help", _) => Input::Help,
        _ => Input::Invalid(format!("unknown command /{name}, try /help")),
    }
}
