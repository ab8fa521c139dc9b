use std::sync::Arc;
use std::time::Duration;

use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::{User, UserId};
use tracing::{info, warn};

use crate::{
    CacheKey, Completion, DirectoryQueryService, DirectoryRepository, EditorState, Notification,
    NotificationSink, OverrideRequest, PermissionOverrideEditor, SaveOutcome,
};

/// Override request rejected by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedOverride {
    /// Request that failed.
    pub request: OverrideRequest,
    /// Error returned by the directory.
    pub error: AppError,
}

/// Summary returned by [`PermissionEditorService::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Requests that succeeded, in issue order.
    pub applied: Vec<OverrideRequest>,
    /// Requests that failed, in issue order.
    pub failed: Vec<FailedOverride>,
    /// Aggregate outcome.
    pub outcome: SaveOutcome,
    /// Confirmation delay before the editor should close, set only when every
    /// change is saved and the refetched user confirms it.
    pub close_after: Option<Duration>,
}

/// Opens permission override editors and commits their plans.
#[derive(Clone)]
pub struct PermissionEditorService {
    repository: Arc<dyn DirectoryRepository>,
    queries: DirectoryQueryService,
    notifications: Arc<dyn NotificationSink>,
    close_delay: Duration,
}

impl PermissionEditorService {
    /// Creates a new editor service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn DirectoryRepository>,
        queries: DirectoryQueryService,
        notifications: Arc<dyn NotificationSink>,
        close_delay: Duration,
    ) -> Self {
        Self {
            repository,
            queries,
            notifications,
            close_delay,
        }
    }

    /// Opens a clean editor for one user.
    pub async fn open(&self, user_id: &UserId) -> AppResult<PermissionOverrideEditor> {
        let user = self.queries.user(user_id).await?;
        Ok(PermissionOverrideEditor::open(user))
    }

    /// Commits the editor's pending changes.
    ///
    /// The baseline is re-read first so the diff runs against the current
    /// effective state; changes the directory already reflects are dropped
    /// without a request. Requests run one at a time in permission id order.
    /// A failed request does not stop the rest; the user is re-read once every
    /// request has resolved and the editor adopts that state whatever the
    /// outcome.
    pub async fn save(&self, editor: &mut PermissionOverrideEditor) -> AppResult<SaveReport> {
        editor.ensure_saveable()?;

        let current = match self.queries.user(editor.user_id()).await {
            Ok(user) => user,
            Err(error) => {
                warn!(
                    user_id = %editor.user_id(),
                    error = %error,
                    "failed to read current permissions before save"
                );
                self.notifications
                    .notify(Notification::error(
                        "Failed to update permissions",
                        error.to_string(),
                    ))
                    .await;
                return Err(error);
            }
        };
        editor.refresh_baseline(current)?;

        if editor.state() == EditorState::Clean {
            editor.discard()?;
            info!(
                user_id = %editor.user_id(),
                "pending permission changes already match the directory"
            );
            self.notifications
                .notify(Notification::success(
                    "Permissions updated",
                    format!(
                        "{} already has the requested permissions.",
                        editor.target().name()
                    ),
                ))
                .await;
            return Ok(SaveReport {
                applied: Vec::new(),
                failed: Vec::new(),
                outcome: SaveOutcome::Saved,
                close_after: Some(self.close_delay),
            });
        }

        let plan = editor.begin_save()?;
        let mut applied = Vec::with_capacity(plan.len());
        let mut failed = Vec::new();

        for planned in &plan.overrides {
            match self.execute(&plan.user_id, planned.request).await {
                Ok(()) => applied.push(planned.request),
                Err(error) => {
                    warn!(
                        user_id = %plan.user_id,
                        permission_id = %planned.request.permission_id(),
                        error = %error,
                        "permission override request failed"
                    );
                    failed.push(FailedOverride {
                        request: planned.request,
                        error,
                    });
                }
            }
        }

        let outcome = SaveOutcome::from_counts(applied.len(), failed.len());
        self.queries.invalidate_user(&plan.user_id).await;
        let refreshed = self.refetch(&plan.user_id).await;
        let confirmed = refreshed.is_some();

        if editor.complete_save(plan.session_id, outcome, refreshed) == Completion::Stale {
            info!(
                user_id = %plan.user_id,
                session_id = %plan.session_id,
                outcome = outcome.as_str(),
                "discarding completion for closed permission editor"
            );
            return Ok(SaveReport {
                applied,
                failed,
                outcome,
                close_after: None,
            });
        }

        self.notifications
            .notify(save_notification(
                editor.target(),
                outcome,
                confirmed,
                &failed,
            ))
            .await;

        info!(
            user_id = %plan.user_id,
            applied = applied.len(),
            failed = failed.len(),
            state = editor.state().as_str(),
            "permission override save finished"
        );

        Ok(SaveReport {
            applied,
            failed,
            close_after: (editor.state() == EditorState::Clean).then_some(self.close_delay),
            outcome,
        })
    }

    /// Re-reads the edited user and refreshes the editor's baseline.
    ///
    /// Called after an external change to the user's roles or overrides.
    pub async fn refresh(&self, editor: &mut PermissionOverrideEditor) -> AppResult<Completion> {
        if editor.is_closed() || editor.state() == EditorState::Saving {
            return Ok(Completion::Stale);
        }

        let user_id = editor.user_id().clone();
        self.queries
            .invalidate(&CacheKey::User(user_id.clone()))
            .await;
        let user = self.queries.user(&user_id).await?;
        editor.refresh_baseline(user)
    }

    async fn execute(&self, user_id: &UserId, request: OverrideRequest) -> AppResult<()> {
        match request {
            OverrideRequest::Set {
                permission_id,
                granted,
            } => {
                self.repository
                    .set_permission_override(user_id, permission_id, granted)
                    .await
            }
            OverrideRequest::Clear { permission_id } => {
                self.repository
                    .clear_permission_override(user_id, permission_id)
                    .await
            }
        }
    }

    async fn refetch(&self, user_id: &UserId) -> Option<User> {
        match self.queries.user(user_id).await {
            Ok(user) => Some(user),
            Err(error) => {
                warn!(user_id = %user_id, error = %error, "failed to refetch user after save");
                None
            }
        }
    }
}

fn save_notification(
    user: &User,
    outcome: SaveOutcome,
    confirmed: bool,
    failed: &[FailedOverride],
) -> Notification {
    match outcome {
        SaveOutcome::Saved if !confirmed => Notification::warning(
            "Permissions saved, reload failed",
            format!(
                "Changes for {} were saved but the current permissions could not be reloaded.",
                user.name()
            ),
        ),
        SaveOutcome::Saved => Notification::success(
            "Permissions updated",
            format!("Saved permission changes for {}.", user.name()),
        ),
        SaveOutcome::PartiallyApplied => Notification::warning(
            "Some permission changes failed",
            format!(
                "{} change(s) for {} were not saved: {}.",
                failed.len(),
                user.name(),
                failed_ids(failed)
            ),
        ),
        SaveOutcome::Failed => Notification::error(
            "Failed to update permissions",
            failed
                .first()
                .map(|entry| entry.error.to_string())
                .unwrap_or_default(),
        ),
    }
}

fn failed_ids(failed: &[FailedOverride]) -> String {
    failed
        .iter()
        .map(|entry| entry.request.permission_id().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
