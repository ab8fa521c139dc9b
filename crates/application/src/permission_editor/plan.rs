use leasedesk_domain::{ChangeKind, PermissionId, StagedChange, User, UserId};

use super::EditorSessionId;
use crate::OverrideRequest;

/// One pending change paired with the request that commits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOverride {
    /// Diff entry.
    pub change: StagedChange<PermissionId>,
    /// Request to issue.
    pub request: OverrideRequest,
}

/// Requests produced by [`super::PermissionOverrideEditor::begin_save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    /// Session that owns the plan.
    pub session_id: EditorSessionId,
    /// Edited user.
    pub user_id: UserId,
    /// Requests in permission id order.
    pub overrides: Vec<PlannedOverride>,
}

impl SavePlan {
    /// Returns the number of requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// Returns whether the plan has no requests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Chooses the override write that makes `change` effective for `user`.
///
/// A change that only undoes an existing manual override clears it, so the
/// role-inherited state shows through again instead of being pinned.
#[must_use]
pub fn plan_override(user: &User, change: StagedChange<PermissionId>) -> PlannedOverride {
    let permission_id = change.key;
    let inherited = user.inherits(permission_id);
    let manual = user.manual_permissions();

    let request = match change.kind {
        ChangeKind::Grant if inherited && manual.removed.contains(&permission_id) => {
            OverrideRequest::Clear { permission_id }
        }
        ChangeKind::Grant => OverrideRequest::Set {
            permission_id,
            granted: true,
        },
        ChangeKind::Revoke if !inherited && manual.added.contains(&permission_id) => {
            OverrideRequest::Clear { permission_id }
        }
        ChangeKind::Revoke => OverrideRequest::Set {
            permission_id,
            granted: false,
        },
    };

    PlannedOverride { change, request }
}
