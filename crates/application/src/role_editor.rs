//! Role administration with a staged permission set.

use std::collections::BTreeSet;

use leasedesk_core::{AppError, AppResult, NonEmptyString};
use leasedesk_domain::{CategoryScope, PermissionCategory, PermissionId, Role, RoleId, StagedEdits};

use crate::RoleInput;

mod service;

pub use service::RoleEditorService;

/// Uncommitted changes to one role.
///
/// The permission set is staged over the stored set (empty for a new role)
/// and committed wholesale on save.
#[derive(Debug, Clone)]
pub struct RoleEditor {
    role_id: Option<RoleId>,
    stored_name: String,
    stored_description: String,
    name: String,
    description: String,
    baseline: BTreeSet<PermissionId>,
    edits: StagedEdits<PermissionId>,
    categories: Vec<PermissionCategory>,
}

impl RoleEditor {
    /// Starts an editor for a role that does not exist yet.
    #[must_use]
    pub fn new_role(categories: Vec<PermissionCategory>) -> Self {
        Self {
            role_id: None,
            stored_name: String::new(),
            stored_description: String::new(),
            name: String::new(),
            description: String::new(),
            baseline: BTreeSet::new(),
            edits: StagedEdits::new(),
            categories,
        }
    }

    /// Starts an editor seeded from a stored role.
    #[must_use]
    pub fn edit_role(role: &Role, categories: Vec<PermissionCategory>) -> Self {
        let description = role.description().unwrap_or_default().to_owned();
        Self {
            role_id: Some(role.id()),
            stored_name: role.name().to_owned(),
            stored_description: description.clone(),
            name: role.name().to_owned(),
            description,
            baseline: role.permissions().clone(),
            edits: StagedEdits::new(),
            categories,
        }
    }

    /// Returns the stored role id, `None` for a new role.
    #[must_use]
    pub fn role_id(&self) -> Option<RoleId> {
        self.role_id
    }

    /// Returns the edited name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the edited description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the categories shown by the editor.
    #[must_use]
    pub fn categories(&self) -> &[PermissionCategory] {
        self.categories.as_slice()
    }

    /// Replaces the edited name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replaces the edited description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Returns whether the permission is shown as granted.
    #[must_use]
    pub fn displayed(&self, permission_id: PermissionId) -> bool {
        self.edits
            .displayed(&permission_id, self.baseline.contains(&permission_id))
    }

    /// Flips one base permission and returns its new displayed state.
    ///
    /// Own and all-scope permissions move only through
    /// [`Self::set_category_scope`].
    pub fn toggle_base(&mut self, permission_id: PermissionId) -> AppResult<bool> {
        if !self
            .categories
            .iter()
            .any(|category| category.base().contains(&permission_id))
        {
            return Err(AppError::Validation(format!(
                "permission '{permission_id}' is not a base permission of any category"
            )));
        }

        Ok(self
            .edits
            .toggle(permission_id, self.baseline.contains(&permission_id)))
    }

    /// Switches a category to own or all scope in one update.
    pub fn set_category_scope(
        &mut self,
        category_name: &str,
        scope: CategoryScope,
    ) -> AppResult<()> {
        let category = self.category(category_name)?;
        if !category.has_scope_switch() {
            return Err(AppError::Validation(format!(
                "category '{category_name}' has no own/all scope switch"
            )));
        }

        let (granted, withheld) = category.scope_assignment(scope);
        let updates: Vec<(PermissionId, bool)> = granted
            .iter()
            .map(|id| (*id, true))
            .chain(withheld.iter().map(|id| (*id, false)))
            .collect();

        for (permission_id, desired) in updates {
            let baseline = self.baseline.contains(&permission_id);
            self.edits.stage_against(permission_id, desired, baseline);
        }
        Ok(())
    }

    /// Returns the switch position shown for a category.
    pub fn category_scope(&self, category_name: &str) -> AppResult<CategoryScope> {
        let category = self.category(category_name)?;
        Ok(category.scope_of(|permission_id| self.displayed(permission_id)))
    }

    /// Returns the permission set that save would commit.
    #[must_use]
    pub fn permissions(&self) -> BTreeSet<PermissionId> {
        let mut permissions = self.baseline.clone();
        for (permission_id, granted) in self.edits.iter() {
            if granted {
                permissions.insert(*permission_id);
            } else {
                permissions.remove(permission_id);
            }
        }
        permissions
    }

    /// Returns whether any field differs from the stored role.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.name.trim() != self.stored_name
            || self.description.trim() != self.stored_description
            || self
                .edits
                .is_dirty(|permission_id| self.baseline.contains(permission_id))
    }

    /// Restores the stored name, description and permission set.
    pub fn discard(&mut self) {
        self.name.clone_from(&self.stored_name);
        self.description.clone_from(&self.stored_description);
        self.edits.clear();
    }

    /// Validates the editor and builds the save payload.
    pub fn to_input(&self) -> AppResult<RoleInput> {
        let name = NonEmptyString::new(self.name.as_str())
            .map_err(|_| AppError::Validation("role name is required".to_owned()))?;
        let description = Some(self.description.trim().to_owned())
            .filter(|description| !description.is_empty());

        Ok(RoleInput {
            name,
            description,
            permissions: self.permissions(),
        })
    }

    /// Rebases the editor onto the role returned by save.
    pub fn mark_saved(&mut self, role: &Role) {
        let categories = std::mem::take(&mut self.categories);
        *self = Self::edit_role(role, categories);
    }

    fn category(&self, category_name: &str) -> AppResult<&PermissionCategory> {
        self.categories
            .iter()
            .find(|category| category.name() == category_name)
            .ok_or_else(|| AppError::NotFound(format!("permission category '{category_name}'")))
    }
}
