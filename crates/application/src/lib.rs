//! Application services and ports.
//!
//! Editors keep uncommitted changes in memory; services own every network
//! write and the cache invalidation that follows it.

#![forbid(unsafe_code)]

mod agreement_ports;
mod agreement_wizard_service;
mod directory_ports;
mod directory_query_service;
mod document_service;
mod notification;
mod permission_editor;
mod permission_editor_service;
mod realtime_sync;
mod role_editor;

#[cfg(test)]
mod test_fixtures;

pub use agreement_ports::{AgreementRepository, DocumentRenderer};
pub use agreement_wizard_service::AgreementWizardService;
pub use directory_ports::{
    CacheKey, CachedValue, DirectoryCache, DirectoryRepository, OverrideRequest, RoleInput,
};
pub use directory_query_service::DirectoryQueryService;
pub use document_service::DocumentService;
pub use notification::{Notification, NotificationLevel, NotificationSink};
pub use permission_editor::{
    Completion, EditorSessionId, EditorState, PermissionOverrideEditor, PlannedOverride,
    SaveOutcome, SavePlan, plan_override,
};
pub use permission_editor_service::{FailedOverride, PermissionEditorService, SaveReport};
pub use realtime_sync::{FrameDisposition, PermissionSyncListener, RealtimeMessage};
pub use role_editor::{RoleEditor, RoleEditorService};
