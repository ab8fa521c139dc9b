//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod agreement;
mod category;
mod document;
mod permission;
mod role;
mod staged;
mod user;
mod wizard;

pub use agreement::{
    Address, Agreement, AgreementId, AgreementStatus, AgreementTerms, Customer, CustomerId,
    DEFAULT_NOTICE_PERIOD_MONTHS, DEFAULT_RENT_DUE_DAY, MobileNumber, NewAgreement, PartyDetails,
    PropertyDetails, tenancy_end_date,
};
pub use category::{CategoryScope, PermissionCategory};
pub use document::{
    AgreementDocumentData, DocumentFormat, DocumentRequest, DocumentTemplateId, RenderedDocument,
};
pub use permission::{Permission, PermissionCatalog, PermissionCode, PermissionId, PermissionScope};
pub use role::{Role, RoleId};
pub use staged::{ChangeKind, StagedChange, StagedEdits, changes_against};
pub use user::{ManualPermissions, User, UserId};
pub use wizard::{
    AddressDraft, AgreementDraft, AgreementWizard, FieldError, MAX_DURATION_MONTHS, PartyDraft,
    PartyRole, PropertyDraft, TermsDraft, WizardStep,
};
