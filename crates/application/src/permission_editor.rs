//! Deferred permission-override editing for one user.
//!
//! Toggles only touch the local overlay. Network writes are produced as a
//! [`SavePlan`] on save and their outcome is folded back through
//! [`PermissionOverrideEditor::complete_save`].

mod plan;

use std::fmt::{Display, Formatter};

use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::{PermissionId, StagedChange, StagedEdits, User, UserId};
use uuid::Uuid;

pub use plan::{PlannedOverride, SavePlan, plan_override};

/// Identifier of one open editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorSessionId(Uuid);

impl EditorSessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for EditorSessionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Editor lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorState {
    /// No staged entry differs from the effective state.
    Clean,
    /// At least one staged entry differs from the effective state.
    Dirty,
    /// A save is in flight; edits are rejected.
    Saving,
}

impl EditorState {
    /// Returns a stable label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
            Self::Saving => "saving",
        }
    }
}

/// Result of the requests issued for one save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveOutcome {
    /// Every request succeeded.
    Saved,
    /// Some requests succeeded and some failed.
    PartiallyApplied,
    /// Every request failed.
    Failed,
}

impl SaveOutcome {
    /// Derives the outcome from request counts.
    #[must_use]
    pub fn from_counts(applied: usize, failed: usize) -> Self {
        match (applied, failed) {
            (_, 0) => Self::Saved,
            (0, _) => Self::Failed,
            _ => Self::PartiallyApplied,
        }
    }

    /// Returns a stable label for logs and reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::PartiallyApplied => "partially_applied",
            Self::Failed => "failed",
        }
    }
}

/// Whether a completion was applied to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// The editor state was updated.
    Applied,
    /// The editor was closed or belongs to another session; nothing changed.
    Stale,
}

/// Uncommitted permission overrides for one user.
#[derive(Debug, Clone)]
pub struct PermissionOverrideEditor {
    session_id: EditorSessionId,
    target: User,
    edits: StagedEdits<PermissionId>,
    state: EditorState,
    closed: bool,
}

impl PermissionOverrideEditor {
    /// Opens a clean editor seeded from the user's effective permissions.
    #[must_use]
    pub fn open(target: User) -> Self {
        Self {
            session_id: EditorSessionId::new(),
            target,
            edits: StagedEdits::new(),
            state: EditorState::Clean,
            closed: false,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn session_id(&self) -> EditorSessionId {
        self.session_id
    }

    /// Returns the last known server state of the edited user.
    #[must_use]
    pub fn target(&self) -> &User {
        &self.target
    }

    /// Returns the edited user's id.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        self.target.id()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Returns whether the session was closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the staged overlay.
    #[must_use]
    pub fn edits(&self) -> &StagedEdits<PermissionId> {
        &self.edits
    }

    /// Returns the effective server-side state of a permission.
    #[must_use]
    pub fn is_effective(&self, permission_id: PermissionId) -> bool {
        self.target.is_granted(permission_id)
    }

    /// Returns the state shown to the operator.
    #[must_use]
    pub fn displayed(&self, permission_id: PermissionId) -> bool {
        self.edits
            .displayed(&permission_id, self.is_effective(permission_id))
    }

    /// Flips one permission locally and returns its new displayed state.
    pub fn toggle(&mut self, permission_id: PermissionId) -> AppResult<bool> {
        self.ensure_editable()?;
        let baseline = self.is_effective(permission_id);
        let displayed = self.edits.toggle(permission_id, baseline);
        self.recompute_state();
        Ok(displayed)
    }

    /// Stages an explicit desired state for one permission.
    pub fn set(&mut self, permission_id: PermissionId, granted: bool) -> AppResult<()> {
        self.ensure_editable()?;
        let baseline = self.is_effective(permission_id);
        self.edits.stage_against(permission_id, granted, baseline);
        self.recompute_state();
        Ok(())
    }

    /// Returns the pending diff against the effective state.
    #[must_use]
    pub fn pending_changes(&self) -> Vec<StagedChange<PermissionId>> {
        self.edits
            .changes_against(|permission_id| self.target.is_granted(*permission_id))
    }

    /// Drops every staged entry.
    pub fn discard(&mut self) -> AppResult<()> {
        if self.state == EditorState::Saving {
            return Err(AppError::Conflict(
                "cannot discard while a save is in flight".to_owned(),
            ));
        }

        self.edits.clear();
        self.state = EditorState::Clean;
        Ok(())
    }

    /// Moves to `Saving` and returns the requests to issue.
    pub fn begin_save(&mut self) -> AppResult<SavePlan> {
        self.ensure_saveable()?;

        let overrides = self
            .pending_changes()
            .into_iter()
            .map(|change| plan_override(&self.target, change))
            .collect();
        self.state = EditorState::Saving;

        Ok(SavePlan {
            session_id: self.session_id,
            user_id: self.target.id().clone(),
            overrides,
        })
    }

    /// Checks that the editor is open and has pending changes.
    pub fn ensure_saveable(&self) -> AppResult<()> {
        self.ensure_open()?;
        if self.state != EditorState::Dirty {
            return Err(AppError::Conflict(format!(
                "save requires pending changes, editor is {}",
                self.state.as_str()
            )));
        }
        Ok(())
    }

    /// Folds the outcome of a save back into the editor.
    ///
    /// `refreshed` is the user as re-read after every request resolved. The
    /// overlay is cleared only when every request succeeded and the refetch
    /// confirmed the new baseline; otherwise it is kept and the editor stays
    /// `Dirty` until a later refresh or save.
    pub fn complete_save(
        &mut self,
        session_id: EditorSessionId,
        outcome: SaveOutcome,
        refreshed: Option<User>,
    ) -> Completion {
        if self.closed || session_id != self.session_id || self.state != EditorState::Saving {
            return Completion::Stale;
        }

        let refreshed = refreshed.filter(|user| user.id() == self.target.id());
        let confirmed = refreshed.is_some();
        if let Some(user) = refreshed {
            self.target = user;
        }

        if outcome == SaveOutcome::Saved && confirmed {
            self.edits.clear();
            self.state = EditorState::Clean;
        } else {
            self.state = EditorState::Dirty;
        }

        Completion::Applied
    }

    /// Replaces the effective baseline after an external change.
    ///
    /// The overlay is untouched. Refreshes arriving mid-save are ignored;
    /// the save completion carries its own refetch.
    pub fn refresh_baseline(&mut self, user: User) -> AppResult<Completion> {
        if user.id() != self.target.id() {
            return Err(AppError::Validation(format!(
                "baseline for user '{}' cannot refresh editor of user '{}'",
                user.id(),
                self.target.id()
            )));
        }
        if self.closed || self.state == EditorState::Saving {
            return Ok(Completion::Stale);
        }

        self.target = user;
        self.recompute_state();
        Ok(Completion::Applied)
    }

    /// Ends the session; later completions are stale.
    pub fn close(&mut self) {
        self.closed = true;
        self.edits.clear();
    }

    fn recompute_state(&mut self) {
        self.state = if self
            .edits
            .is_dirty(|permission_id| self.target.is_granted(*permission_id))
        {
            EditorState::Dirty
        } else {
            EditorState::Clean
        };
    }

    fn ensure_open(&self) -> AppResult<()> {
        if self.closed {
            return Err(AppError::Conflict(format!(
                "editor session '{}' is closed",
                self.session_id
            )));
        }
        Ok(())
    }

    fn ensure_editable(&self) -> AppResult<()> {
        self.ensure_open()?;
        if self.state == EditorState::Saving {
            return Err(AppError::Conflict(
                "permissions cannot change while a save is in flight".to_owned(),
            ));
        }
        Ok(())
    }
}
