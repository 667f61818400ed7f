//! Notification events emitted after mutations. Display and dismissal are
//! up to whoever subscribes.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Neutral,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

pub trait NotificationBus: Send + Sync {
    fn publish(&self, notification: Notification);
}

/// Fans notifications out to any number of subscribers.
pub struct BroadcastBus {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl NotificationBus for BroadcastBus {
    fn publish(&self, notification: Notification) {
        // No subscribers is fine; nobody is looking.
        let _ = self.sender.send(notification);
    }
}

/// Writes notifications to the log.
pub struct TracingBus;

impl NotificationBus for TracingBus {
    fn publish(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => warn!("[notify:error] {}", notification.message),
            Severity::Success => info!("[notify:success] {}", notification.message),
            Severity::Neutral => info!("[notify] {}", notification.message),
        }
    }
}
