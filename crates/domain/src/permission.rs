use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use leasedesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Stable identifier of a seeded permission row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(i64);

impl PermissionId {
    /// Creates a permission identifier from its storage value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the storage value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Scope carried by the last segment of a permission code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    /// Not scope dependent, e.g. `agreement.create`.
    Base,
    /// Restricted to records owned by the holder, e.g. `agreement.view.own`.
    Own,
    /// Applies to every record in the tenant, e.g. `agreement.view.all`.
    All,
}

/// Dotted permission code such as `agreement.view.own`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Creates a validated permission code.
    ///
    /// Codes are lowercased and must contain at least two non-empty segments
    /// made of ASCII letters, digits or underscores.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_lowercase();
        let segments: Vec<&str> = value.split('.').collect();

        if segments.len() < 2 {
            return Err(AppError::Validation(format!(
                "permission code '{value}' must contain at least two dotted segments"
            )));
        }

        let valid_segment = |segment: &&str| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|character| character.is_ascii_alphanumeric() || character == '_')
        };
        if !segments.iter().all(valid_segment) {
            return Err(AppError::Validation(format!(
                "permission code '{value}' contains an empty or invalid segment"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the resource segment (`agreement` in `agreement.view.own`).
    #[must_use]
    pub fn resource(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    /// Returns the scope derived from the final segment.
    #[must_use]
    pub fn scope(&self) -> PermissionScope {
        match self.0.rsplit('.').next() {
            Some("own") => PermissionScope::Own,
            Some("all") => PermissionScope::All,
            _ => PermissionScope::Base,
        }
    }

    /// Returns the code with the scope segment removed, when scoped.
    ///
    /// `agreement.view.own` and `agreement.view.all` share the stem
    /// `agreement.view`; base codes are their own stem.
    #[must_use]
    pub fn stem(&self) -> &str {
        match self.scope() {
            PermissionScope::Base => self.as_str(),
            PermissionScope::Own | PermissionScope::All => self
                .0
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(self.as_str()),
        }
    }
}

impl FromStr for PermissionCode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for PermissionCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionCode> for String {
    fn from(value: PermissionCode) -> Self {
        value.0
    }
}

impl Display for PermissionCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Immutable permission reference data seeded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    code: PermissionCode,
    description: String,
    category: String,
}

impl Permission {
    /// Creates a permission record.
    pub fn new(
        id: PermissionId,
        code: PermissionCode,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> AppResult<Self> {
        let category = category.into().trim().to_owned();
        if category.is_empty() {
            return Err(AppError::Validation(format!(
                "permission '{code}' must belong to a category"
            )));
        }

        Ok(Self {
            id,
            code,
            description: description.into(),
            category,
        })
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the dotted permission code.
    #[must_use]
    pub fn code(&self) -> &PermissionCode {
        &self.code
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the category label, e.g. `Agreements`.
    #[must_use]
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Returns the scope of the permission code.
    #[must_use]
    pub fn scope(&self) -> PermissionScope {
        self.code.scope()
    }
}

/// Indexed permission reference data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionCatalog {
    by_id: BTreeMap<PermissionId, Permission>,
    ids_by_code: HashMap<PermissionCode, PermissionId>,
}

impl PermissionCatalog {
    /// Builds a catalog, rejecting duplicate ids or codes.
    pub fn new(permissions: Vec<Permission>) -> AppResult<Self> {
        let mut by_id = BTreeMap::new();
        let mut ids_by_code = HashMap::new();

        for permission in permissions {
            if ids_by_code.contains_key(permission.code()) {
                return Err(AppError::Conflict(format!(
                    "permission code '{}' is listed more than once",
                    permission.code()
                )));
            }
            if by_id.contains_key(&permission.id()) {
                return Err(AppError::Conflict(format!(
                    "permission id '{}' is listed more than once",
                    permission.id()
                )));
            }

            ids_by_code.insert(permission.code().clone(), permission.id());
            by_id.insert(permission.id(), permission);
        }

        Ok(Self { by_id, ids_by_code })
    }

    /// Returns the permission with the given id.
    #[must_use]
    pub fn get(&self, id: PermissionId) -> Option<&Permission> {
        self.by_id.get(&id)
    }

    /// Returns the permission with the given code.
    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&Permission> {
        let code = PermissionCode::new(code).ok()?;
        self.ids_by_code
            .get(&code)
            .and_then(|id| self.by_id.get(id))
    }

    /// Resolves a code to an id, failing for unknown codes.
    pub fn resolve_code(&self, code: &str) -> AppResult<PermissionId> {
        self.find_by_code(code)
            .map(Permission::id)
            .ok_or_else(|| AppError::NotFound(format!("unknown permission code '{code}'")))
    }

    /// Iterates permissions ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.by_id.values()
    }

    /// Returns the number of permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
