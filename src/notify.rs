//! User-facing notification channel.
//!
//! The transport and stores never render anything themselves; they publish
//! `Notice` values here and whatever frontend is attached (the CLI, a TUI,
//! a test) decides how to present them. Publishing is fire-and-forget: a
//! notice with no subscriber is dropped, not an error.

use tokio::sync::broadcast;

/// Buffered notices per subscriber before the oldest are dropped.
const NOTICE_BUFFER: usize = 64;

/// Something the user should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A request failed; `message` is already human-readable.
    Error { message: String },
    /// The session credential was rejected. The consumer should send the
    /// user back to its login surface.
    AuthRequired,
}

/// Cloneable handle to the notice channel. Clones share one channel, so a
/// subscriber sees notices published through any handle.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Publishes an error notice. Send failures mean nobody is listening;
    /// they are ignored.
    pub fn error(&self, message: impl Into<String>) {
        let _ = self.tx.send(Notice::Error {
            message: message.into(),
        });
    }

    /// Publishes the login-required signal.
    pub fn auth_required(&self) {
        let _ = self.tx.send(Notice::AuthRequired);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_notices_in_order() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.error("first");
        notifier.auth_required();

        assert_eq!(
            rx.recv().await.unwrap(),
            Notice::Error {
                message: "first".to_string()
            }
        );
        assert_eq!(rx.recv().await.unwrap(), Notice::AuthRequired);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let notifier = Notifier::new();
        notifier.error("nobody is listening");
        notifier.auth_required();
    }

    #[tokio::test]
    async fn test_clones_share_one_channel() {
        let notifier = Notifier::new();
        let clone = notifier.clone();
        let mut rx = notifier.subscribe();

        clone.error("via clone");

        assert_eq!(
            rx.recv().await.unwrap(),
            Notice::Error {
                message: "via clone".to_string()
            }
        );
    }
}
