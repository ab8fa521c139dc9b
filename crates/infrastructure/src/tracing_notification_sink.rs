//! Notification sink for terminal use. Renders notifications to tracing output.

use async_trait::async_trait;
use leasedesk_application::{Notification, NotificationLevel, NotificationSink};
use tracing::{info, warn};

/// Notification sink that logs operator notifications.
#[derive(Clone, Default)]
pub struct TracingNotificationSink;

impl TracingNotificationSink {
    /// Creates a new tracing notification sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, notification: Notification) {
        let Notification {
            level,
            title,
            message,
        } = notification;

        match level {
            NotificationLevel::Success => info!(title = %title, "{message}"),
            NotificationLevel::Warning | NotificationLevel::Error => {
                warn!(level = ?level, title = %title, "{message}");
            }
        }
    }
}
