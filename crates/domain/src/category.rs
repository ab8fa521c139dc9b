use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::permission::{Permission, PermissionCatalog, PermissionId, PermissionScope};

/// Scope selected by a category's own/all switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryScope {
    /// Own-scope permissions granted, all-scope permissions withheld.
    Own,
    /// All-scope permissions granted, own-scope permissions withheld.
    All,
}

/// Permissions of one category split into base, own-scope and all-scope groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCategory {
    name: String,
    base: BTreeSet<PermissionId>,
    own_scope: BTreeSet<PermissionId>,
    all_scope: BTreeSet<PermissionId>,
}

impl PermissionCategory {
    /// Creates an empty category.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: BTreeSet::new(),
            own_scope: BTreeSet::new(),
            all_scope: BTreeSet::new(),
        }
    }

    /// Groups every catalog permission by its category, ordered by name.
    #[must_use]
    pub fn from_catalog(catalog: &PermissionCatalog) -> Vec<Self> {
        let mut categories: BTreeMap<&str, Self> = BTreeMap::new();
        for permission in catalog.iter() {
            categories
                .entry(permission.category())
                .or_insert_with(|| Self::new(permission.category()))
                .insert(permission);
        }

        categories.into_values().collect()
    }

    fn insert(&mut self, permission: &Permission) {
        let group = match permission.scope() {
            PermissionScope::Base => &mut self.base,
            PermissionScope::Own => &mut self.own_scope,
            PermissionScope::All => &mut self.all_scope,
        };
        group.insert(permission.id());
    }

    /// Returns the category label.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns base permissions, controlled one checkbox at a time.
    #[must_use]
    pub fn base(&self) -> &BTreeSet<PermissionId> {
        &self.base
    }

    /// Returns own-scope permissions.
    #[must_use]
    pub fn own_scope(&self) -> &BTreeSet<PermissionId> {
        &self.own_scope
    }

    /// Returns all-scope permissions.
    #[must_use]
    pub fn all_scope(&self) -> &BTreeSet<PermissionId> {
        &self.all_scope
    }

    /// Returns whether the category exposes an own/all switch.
    #[must_use]
    pub fn has_scope_switch(&self) -> bool {
        !self.own_scope.is_empty() || !self.all_scope.is_empty()
    }

    /// Returns whether the permission belongs to this category.
    #[must_use]
    pub fn contains(&self, permission_id: PermissionId) -> bool {
        self.base.contains(&permission_id)
            || self.own_scope.contains(&permission_id)
            || self.all_scope.contains(&permission_id)
    }

    /// Returns `(granted, withheld)` permissions for a scope switch position.
    #[must_use]
    pub fn scope_assignment(
        &self,
        scope: CategoryScope,
    ) -> (&BTreeSet<PermissionId>, &BTreeSet<PermissionId>) {
        match scope {
            CategoryScope::Own => (&self.own_scope, &self.all_scope),
            CategoryScope::All => (&self.all_scope, &self.own_scope),
        }
    }

    /// Derives the switch position from a granted set.
    ///
    /// Any granted all-scope permission puts the switch on `All`.
    #[must_use]
    pub fn scope_of(&self, is_granted: impl Fn(PermissionId) -> bool) -> CategoryScope {
        if self.all_scope.iter().any(|id| is_granted(*id)) {
            CategoryScope::All
        } else {
            CategoryScope::Own
        }
    }
}
