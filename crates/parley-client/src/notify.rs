//! Ephemeral user notifications.
//!
//! Every notification expires after a fixed time and can be dismissed before
//! that. Expiry is driven by deadlines polled from the client loop, so a
//! dismissed notification simply has nothing left to expire.

use parley_core::Severity;
use std::fmt;
use std::future::pending;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};

use crate::config::NOTIFICATION_TTL;

/// Handle for dismissing a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl NotificationId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A visible alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub severity: Severity,
    pub message: String,
    pub created_at: Instant,
    pub expires_at: Instant,
}

/// Draws notifications as they appear and disappear.
pub trait NotificationRenderer {
    fn shown(&mut self, notification: &Notification);

    fn removed(&mut self, _id: NotificationId) {}
}

impl NotificationRenderer for () {
    fn shown(&mut self, _notification: &Notification) {}
}

/// Owns the visible notification list.
pub struct NotificationCenter {
    renderer: Box<dyn NotificationRenderer>,
    visible: Vec<Notification>,
    next_id: u64,
    ttl: Duration,
}

impl NotificationCenter {
    pub fn new(renderer: Box<dyn NotificationRenderer>) -> Self {
        Self::with_ttl(renderer, NOTIFICATION_TTL)
    }

    pub fn with_ttl(renderer: Box<dyn NotificationRenderer>, ttl: Duration) -> Self {
        Self {
            renderer,
            visible: Vec::new(),
            next_id: 1,
            ttl,
        }
    }

    /// Show a notification and schedule its removal.
    pub fn show(&mut self, severity: Severity, message: impl Into<String>) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;

        let created_at = Instant::now();
        let notification = Notification {
            id,
            severity,
            message: message.into(),
            created_at,
            expires_at: created_at + self.ttl,
        };
        tracing::debug!("Notification {} [{}]: {}", id, severity, notification.message);

        self.renderer.shown(&notification);
        self.visible.push(notification);
        id
    }

    /// Remove a notification now. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let Some(index) = self.visible.iter().position(|n| n.id == id) else {
            return false;
        };
        self.visible.remove(index);
        self.renderer.removed(id);
        true
    }

    /// Drop every notification whose deadline is at or before `now`.
    pub fn expire(&mut self, now: Instant) -> usize {
        let mut expired = Vec::new();
        self.visible.retain(|n| {
            let keep = n.expires_at > now;
            if !keep {
                expired.push(n.id);
            }
            keep
        });
        for id in &expired {
            self.renderer.removed(*id);
        }
        expired.len()
    }

    /// Earliest pending expiry.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.visible.iter().map(|n| n.expires_at).min()
    }

    /// Resolves when the earliest notification is due; never if none are shown.
    pub async fn expiry_due(&self) {
        match self.next_expiry() {
            Some(at) => sleep_until(at).await,
            None => pending().await,
        }
    }

    /// Currently visible notifications, oldest first.
    pub fn visible(&self) -> &[Notification] {
        &self.visible
    }
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("visible", &self.visible)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
