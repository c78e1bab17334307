//! Client timing and defaults.

use parley_core::Endpoint;
use std::time::Duration;

/// Delay before reopening a closed session. Fixed, retried forever.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);
/// Period of the automatic status check.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// How long a notification stays visible unless dismissed.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Languages the translation service accepts.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "fr"];
pub const DEFAULT_TARGET_LANG: &str = "es";

/// Resolved settings for a [`ChatClient`](crate::ChatClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    pub target_lang: String,
    pub reconnect_delay: Duration,
    pub poll_interval: Duration,
    pub notification_ttl: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            reconnect_delay: RECONNECT_DELAY,
            poll_interval: POLL_INTERVAL,
            notification_ttl: NOTIFICATION_TTL,
        }
    }

    pub fn with_target_lang(mut self, lang: impl Into<String>) -> Self {
        self.target_lang = lang.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Endpoint::default())
    }
}

/// Whether the translation service is known to handle `lang`.
pub(crate) fn is_supported(lang: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&lang)
}
