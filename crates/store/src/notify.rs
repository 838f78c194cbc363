//! User-facing notifications emitted by the cart store.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Every scenario the store reports, each with a fixed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// The requested quantity is more than the stock can cover.
    OutOfStock,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
    /// The saved cart could not be read back at startup.
    RestoreFailed,
}

impl NoticeKind {
    pub fn message(self) -> &'static str {
        match self {
            NoticeKind::OutOfStock => "Requested quantity is out of stock",
            NoticeKind::AddFailed => "Failed to add product",
            NoticeKind::RemoveFailed => "Failed to remove product",
            NoticeKind::UpdateFailed => "Failed to update product quantity",
            NoticeKind::RestoreFailed => "Saved cart could not be restored",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            NoticeKind::OutOfStock | NoticeKind::RestoreFailed => Severity::Warning,
            NoticeKind::AddFailed | NoticeKind::RemoveFailed | NoticeKind::UpdateFailed => {
                Severity::Error
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub kind: NoticeKind,
}

impl Notification {
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            severity: kind.severity(),
            kind,
        }
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

impl core::fmt::Display for Notification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: {}", self.message())
    }
}

/// Fire-and-forget sink for notifications. Must not block or fail.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Warning => {
                tracing::warn!(kind = ?notification.kind, "{}", notification.message())
            }
            Severity::Error => {
                tracing::error!(kind = ?notification.kind, "{}", notification.message())
            }
        }
    }
}

/// Forwards notifications to a UI through an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // A closed receiver means nobody is displaying notifications anymore.
        let _ = self.tx.send(notification);
    }
}
