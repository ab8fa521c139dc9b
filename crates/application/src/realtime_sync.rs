use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::DirectoryQueryService;

/// Message pushed by the realtime channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeMessage {
    /// Roles or overrides changed on the server.
    PermissionsUpdate {
        /// Free-form reason supplied by the server.
        #[serde(default)]
        reason: Option<String>,
    },
    /// Any message type this client does not act on.
    #[serde(other)]
    Unknown,
}

/// What happened to one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDisposition {
    /// Permission-bearing cache entries were dropped.
    Applied {
        /// Number of dropped entries.
        dropped: usize,
    },
    /// The frame was valid but not relevant.
    Ignored,
    /// The frame could not be decoded.
    Malformed,
}

/// Applies realtime permission updates to the directory query cache.
///
/// Open editors are not touched; callers refresh their baselines when the
/// next read goes through the invalidated cache.
#[derive(Clone)]
pub struct PermissionSyncListener {
    queries: DirectoryQueryService,
}

impl PermissionSyncListener {
    /// Creates a listener over the query service.
    #[must_use]
    pub fn new(queries: DirectoryQueryService) -> Self {
        Self { queries }
    }

    /// Decodes and applies one raw frame.
    pub async fn handle_frame(&self, frame: &str) -> FrameDisposition {
        let message = match serde_json::from_str::<RealtimeMessage>(frame) {
            Ok(message) => message,
            Err(error) => {
                warn!(error = %error, "skipping malformed realtime frame");
                return FrameDisposition::Malformed;
            }
        };

        match message {
            RealtimeMessage::PermissionsUpdate { reason } => {
                let dropped = self.queries.invalidate_permission_bearing().await;
                info!(
                    reason = reason.as_deref().unwrap_or("unspecified"),
                    dropped, "applied realtime permissions update"
                );
                FrameDisposition::Applied { dropped }
            }
            RealtimeMessage::Unknown => {
                debug!("ignoring realtime frame");
                FrameDisposition::Ignored
            }
        }
    }

    /// Consumes frames until the sender side closes.
    ///
    /// Returns the number of applied permission updates.
    pub async fn run(&self, mut frames: mpsc::Receiver<String>) -> usize {
        let mut applied = 0;
        while let Some(frame) = frames.recv().await {
            if matches!(
                self.handle_frame(frame.as_str()).await,
                FrameDisposition::Applied { .. }
            ) {
                applied += 1;
            }
        }

        info!(applied, "realtime channel closed");
        applied
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::{FrameDisposition, PermissionSyncListener, RealtimeMessage};
    use crate::DirectoryQueryService;
    use crate::test_fixtures::{FakeCache, FakeDirectory, manager_user, user_id};

    fn listener() -> (PermissionSyncListener, DirectoryQueryService) {
        let queries = DirectoryQueryService::new(
            Arc::new(FakeDirectory::with_user(manager_user())),
            Arc::new(FakeCache::default()),
            60,
        );
        (PermissionSyncListener::new(queries.clone()), queries)
    }

    #[test]
    fn decodes_known_and_unknown_types() {
        let update = serde_json::from_str::<RealtimeMessage>(
            r#"{"type":"permissions_update","reason":"role changed"}"#,
        );
        assert_eq!(
            update.ok(),
            Some(RealtimeMessage::PermissionsUpdate {
                reason: Some("role changed".to_owned()),
            })
        );

        let other = serde_json::from_str::<RealtimeMessage>(r#"{"type":"agreement_signed"}"#);
        assert_eq!(other.ok(), Some(RealtimeMessage::Unknown));
    }

    #[tokio::test]
    async fn permissions_update_drops_user_entries() {
        let (listener, queries) = listener();
        assert!(queries.permissions().await.is_ok());
        assert!(queries.roles().await.is_ok());
        assert!(queries.user(&user_id("u-1")).await.is_ok());

        let disposition = listener
            .handle_frame(r#"{"type":"permissions_update"}"#)
            .await;

        assert_eq!(disposition, FrameDisposition::Applied { dropped: 2 });
    }

    #[tokio::test]
    async fn malformed_frames_are_skipped() {
        let (listener, _) = listener();
        assert_eq!(
            listener.handle_frame("not json").await,
            FrameDisposition::Malformed
        );
        assert_eq!(
            listener.handle_frame(r#"{"type":"heartbeat"}"#).await,
            FrameDisposition::Ignored
        );
    }

    #[tokio::test]
    async fn run_counts_updates_until_channel_closes() {
        let (listener, _) = listener();
        let (sender, receiver) = mpsc::channel(8);
        for frame in [
            r#"{"type":"permissions_update","reason":"a"}"#,
            "garbage",
            r#"{"type":"heartbeat"}"#,
            r#"{"type":"permissions_update"}"#,
        ] {
            assert!(sender.send(frame.to_owned()).await.is_ok());
        }
        drop(sender);

        assert_eq!(listener.run(receiver).await, 2);
    }
}
