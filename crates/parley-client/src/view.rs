//! Seam into the display layer.

/// A line in the chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatLine {
    System(String),
    Status(String),
    /// Echo of our own message, rendered before the server answers.
    Sent(String),
    Received {
        text: String,
        translation: Option<String>,
    },
}

/// Renders chat lines.
pub trait ChatView {
    fn line(&mut self, line: ChatLine);
}

impl ChatView for Vec<ChatLine> {
    fn line(&mut self, line: ChatLine) {
        self.push(line);
    }
}
