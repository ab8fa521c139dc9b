use leasedesk_domain::PermissionId;
use serde::{Deserialize, Serialize};

/// One write against a user's permission overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideRequest {
    /// Stores an explicit grant or denial (`POST .../permission-overrides`).
    Set {
        /// Target permission.
        permission_id: PermissionId,
        /// Desired state.
        granted: bool,
    },
    /// Removes the override so the role-inherited state applies again
    /// (`DELETE .../permission-overrides/{permissionId}`).
    Clear {
        /// Target permission.
        permission_id: PermissionId,
    },
}

impl OverrideRequest {
    /// Returns the permission touched by the request.
    #[must_use]
    pub fn permission_id(&self) -> PermissionId {
        match self {
            Self::Set { permission_id, .. } | Self::Clear { permission_id } => *permission_id,
        }
    }
}
