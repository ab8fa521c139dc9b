use async_trait::async_trait;

/// Severity of an operator notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    /// Completed as requested.
    Success,
    /// Completed with caveats.
    Warning,
    /// Rejected or failed.
    Error,
}

/// Transient operator-facing message (a toast in the web client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Short headline.
    pub title: String,
    /// Detail line.
    pub message: String,
}

impl Notification {
    /// Creates a success notification.
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates a warning notification.
    #[must_use]
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates an error notification.
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Port that surfaces notifications to the operator.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Publishes one notification. Delivery failures are the sink's concern.
    async fn notify(&self, notification: Notification);
}
