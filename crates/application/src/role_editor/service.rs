use std::sync::Arc;

use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::{Role, RoleId};
use tracing::{info, warn};

use super::RoleEditor;
use crate::{DirectoryQueryService, DirectoryRepository, Notification, NotificationSink};

/// Opens role editors and commits them.
#[derive(Clone)]
pub struct RoleEditorService {
    repository: Arc<dyn DirectoryRepository>,
    queries: DirectoryQueryService,
    notifications: Arc<dyn NotificationSink>,
}

impl RoleEditorService {
    /// Creates a new role editor service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn DirectoryRepository>,
        queries: DirectoryQueryService,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository,
            queries,
            notifications,
        }
    }

    /// Starts an editor for a new role.
    pub async fn new_role(&self) -> AppResult<RoleEditor> {
        Ok(RoleEditor::new_role(self.queries.categories().await?))
    }

    /// Starts an editor for a stored role.
    pub async fn open(&self, role_id: RoleId) -> AppResult<RoleEditor> {
        let roles = self.queries.roles().await?;
        let role = roles
            .iter()
            .find(|role| role.id() == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}'")))?;

        Ok(RoleEditor::edit_role(role, self.queries.categories().await?))
    }

    /// Validates and commits the editor, replacing the stored permission set.
    pub async fn save(&self, editor: &mut RoleEditor) -> AppResult<Role> {
        let input = editor.to_input()?;
        let roles = self.queries.roles().await?;
        if roles.iter().any(|role| {
            Some(role.id()) != editor.role_id()
                && role.name().eq_ignore_ascii_case(input.name.as_str())
        }) {
            return Err(AppError::Conflict(format!(
                "role name '{}' is already in use",
                input.name
            )));
        }

        let result = match editor.role_id() {
            Some(role_id) => self.repository.update_role(role_id, input).await,
            None => self.repository.create_role(input).await,
        };

        let role = match result {
            Ok(role) => role,
            Err(error) => {
                warn!(role = editor.name(), error = %error, "role save failed");
                self.notifications
                    .notify(Notification::error("Failed to save role", error.to_string()))
                    .await;
                return Err(error);
            }
        };

        let dropped = self.queries.invalidate_permission_bearing().await;
        info!(role_id = %role.id(), dropped, "role saved");
        editor.mark_saved(&role);
        self.notifications
            .notify(Notification::success(
                "Role saved",
                format!("Saved role {}.", role.name()),
            ))
            .await;

        Ok(role)
    }
}
