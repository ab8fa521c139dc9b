//! Shared fakes for application service tests.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::{
    Address, Agreement, AgreementId, AgreementStatus, AgreementTerms, Customer, CustomerId,
    DocumentRequest, ManualPermissions, MobileNumber, NewAgreement, PartyDetails, Permission,
    PermissionCode, PermissionId, PropertyDetails, RenderedDocument, Role, RoleId, User, UserId,
};
use tokio::sync::Mutex;

use crate::{
    AgreementRepository, CacheKey, CachedValue, DirectoryCache, DirectoryRepository,
    DocumentRenderer, Notification, NotificationSink, RoleInput,
};

pub const VIEW_OWN: i64 = 1;
pub const VIEW_ALL: i64 = 2;
pub const EDIT_OWN: i64 = 3;
pub const EDIT_ALL: i64 = 4;
pub const CREATE: i64 = 5;
pub const USER_MANAGE: i64 = 6;

pub fn pid(value: i64) -> PermissionId {
    PermissionId::new(value)
}

pub fn permissions() -> Vec<Permission> {
    [
        (VIEW_OWN, "agreement.view.own", "Agreements"),
        (VIEW_ALL, "agreement.view.all", "Agreements"),
        (EDIT_OWN, "agreement.edit.own", "Agreements"),
        (EDIT_ALL, "agreement.edit.all", "Agreements"),
        (CREATE, "agreement.create", "Agreements"),
        (USER_MANAGE, "user.manage", "Users"),
    ]
    .into_iter()
    .filter_map(|(id, code, category)| {
        let code = PermissionCode::new(code).ok()?;
        Permission::new(pid(id), code, "", category).ok()
    })
    .collect()
}

pub fn manager_role() -> Role {
    Role::new(
        RoleId::new(10),
        "Manager",
        Some("Branch manager".to_owned()),
        [pid(VIEW_OWN), pid(EDIT_OWN)],
    )
    .unwrap_or_else(|error| panic!("{error}"))
}

pub fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|error| panic!("{error}"))
}

pub fn manager_user() -> User {
    User::new(
        user_id("u-1"),
        "priya",
        "Priya Nair",
        vec![manager_role()],
        ManualPermissions::default(),
    )
}

/// One write observed by the fake directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryWrite {
    SetOverride {
        user_id: UserId,
        permission_id: PermissionId,
        granted: bool,
    },
    ClearOverride {
        user_id: UserId,
        permission_id: PermissionId,
    },
    CreateRole(RoleInput),
    UpdateRole(RoleId, RoleInput),
}

#[derive(Default)]
pub struct FakeDirectory {
    pub roles: Mutex<Vec<Role>>,
    pub users: Mutex<HashMap<UserId, User>>,
    pub writes: Mutex<Vec<DirectoryWrite>>,
    pub reads: Mutex<usize>,
    pub failing_permissions: BTreeSet<PermissionId>,
    pub fail_reads: Mutex<bool>,
}

impl FakeDirectory {
    pub fn with_user(user: User) -> Self {
        Self {
            roles: Mutex::new(user.roles().to_vec()),
            users: Mutex::new(HashMap::from([(user.id().clone(), user)])),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, permission_id: PermissionId) -> Self {
        self.failing_permissions.insert(permission_id);
        self
    }

    pub async fn write_log(&self) -> Vec<DirectoryWrite> {
        self.writes.lock().await.clone()
    }

    pub async fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().await = fail;
    }

    pub async fn read_count(&self) -> usize {
        *self.reads.lock().await
    }

    async fn record_read(&self) -> AppResult<()> {
        *self.reads.lock().await += 1;
        if *self.fail_reads.lock().await {
            return Err(AppError::Transport("directory unreachable".to_owned()));
        }
        Ok(())
    }

    async fn update_manual(
        &self,
        user_id: &UserId,
        permission_id: PermissionId,
        apply: impl FnOnce(&mut ManualPermissions),
    ) -> AppResult<()> {
        if self.failing_permissions.contains(&permission_id) {
            return Err(AppError::Transport(format!(
                "override write for permission '{permission_id}' timed out"
            )));
        }

        let mut users = self.users.lock().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))?;
        let mut manual = user.manual_permissions().clone();
        apply(&mut manual);
        *user = User::new(
            user.id().clone(),
            user.username(),
            user.name(),
            user.roles().to_vec(),
            manual,
        );
        Ok(())
    }
}

#[async_trait]
impl DirectoryRepository for FakeDirectory {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.record_read().await?;
        Ok(permissions())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.record_read().await?;
        Ok(self.roles.lock().await.clone())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.record_read().await?;
        let mut users: Vec<User> = self.users.lock().await.values().cloned().collect();
        users.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(users)
    }

    async fn find_user(&self, user_id: &UserId) -> AppResult<User> {
        self.record_read().await?;
        self.users
            .lock()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))
    }

    async fn set_permission_override(
        &self,
        user_id: &UserId,
        permission_id: PermissionId,
        granted: bool,
    ) -> AppResult<()> {
        self.writes.lock().await.push(DirectoryWrite::SetOverride {
            user_id: user_id.clone(),
            permission_id,
            granted,
        });
        self.update_manual(user_id, permission_id, |manual| {
            if granted {
                manual.removed.remove(&permission_id);
                manual.added.insert(permission_id);
            } else {
                manual.added.remove(&permission_id);
                manual.removed.insert(permission_id);
            }
        })
        .await
    }

    async fn clear_permission_override(
        &self,
        user_id: &UserId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.writes.lock().await.push(DirectoryWrite::ClearOverride {
            user_id: user_id.clone(),
            permission_id,
        });
        self.update_manual(user_id, permission_id, |manual| {
            manual.added.remove(&permission_id);
            manual.removed.remove(&permission_id);
        })
        .await
    }

    async fn create_role(&self, input: RoleInput) -> AppResult<Role> {
        self.writes
            .lock()
            .await
            .push(DirectoryWrite::CreateRole(input.clone()));
        let mut roles = self.roles.lock().await;
        let next_id = roles
            .iter()
            .map(|role| role.id().as_i64())
            .max()
            .unwrap_or_default()
            + 1;
        let role = Role::new(
            RoleId::new(next_id),
            input.name.as_str(),
            input.description,
            input.permissions,
        )?;
        roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(&self, role_id: RoleId, input: RoleInput) -> AppResult<Role> {
        self.writes
            .lock()
            .await
            .push(DirectoryWrite::UpdateRole(role_id, input.clone()));
        let mut roles = self.roles.lock().await;
        let stored = roles
            .iter_mut()
            .find(|role| role.id() == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}'")))?;
        *stored = Role::new(role_id, input.name.as_str(), input.description, input.permissions)?;
        Ok(stored.clone())
    }
}

#[derive(Default)]
pub struct FakeCache {
    pub entries: Mutex<HashMap<CacheKey, CachedValue>>,
}

#[async_trait]
impl DirectoryCache for FakeCache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<CachedValue>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: CacheKey, value: CachedValue, ttl_seconds: u32) -> AppResult<()> {
        if ttl_seconds > 0 {
            self.entries.lock().await.insert(key, value);
        }
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn invalidate_matching(
        &self,
        predicate: &(dyn for<'k> Fn(&'k CacheKey) -> bool + Send + Sync),
    ) -> AppResult<usize> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        Ok(before - entries.len())
    }
}

#[derive(Default)]
pub struct RecordingNotifications {
    pub notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifications {
    pub async fn recorded(&self) -> Vec<Notification> {
        self.notifications.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifications {
    async fn notify(&self, notification: Notification) {
        self.notifications.lock().await.push(notification);
    }
}

pub fn mobile(value: &str) -> MobileNumber {
    MobileNumber::new(value).unwrap_or_else(|error| panic!("{error}"))
}

pub fn tenant_customer() -> Customer {
    Customer {
        id: CustomerId::new(3),
        name: "Anita Shah".to_owned(),
        mobile: mobile("9123456780"),
        email: Some("anita@example.com".to_owned()),
        address: Address {
            line1: "7 Park Street".to_owned(),
            city: "Kolkata".to_owned(),
            state: "West Bengal".to_owned(),
            pincode: "700016".to_owned(),
            ..Address::default()
        },
    }
}

fn party(name: &str, number: &str) -> PartyDetails {
    PartyDetails {
        name: name.to_owned(),
        mobile: mobile(number),
        email: None,
        address: Address::default(),
    }
}

pub fn stored_agreement() -> Agreement {
    let start_date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap_or_default();
    let end_date = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap_or_default();
    Agreement {
        id: AgreementId::new(42),
        agreement_number: "AGR-2025-0042".to_owned(),
        status: AgreementStatus::Active,
        owner: party("Ravi Kumar", "9876543210"),
        tenant: party("Anita Shah", "9123456780"),
        property: PropertyDetails {
            property_type: "2BHK flat".to_owned(),
            address: Address::default(),
            area_sqft: Some(950),
            furnishing: None,
        },
        terms: AgreementTerms {
            start_date,
            end_date,
            duration_months: 11,
            monthly_rent: 25_000,
            security_deposit: 75_000,
            maintenance_charge: None,
            notice_period_months: 1,
            rent_due_day: 5,
        },
        language: "english".to_owned(),
    }
}

#[derive(Default)]
pub struct FakeAgreements {
    pub customers: Vec<Customer>,
    pub agreements: Mutex<Vec<Agreement>>,
    pub created: Mutex<Vec<NewAgreement>>,
    pub reject_creates: bool,
}

impl FakeAgreements {
    pub fn with_agreement(agreement: Agreement) -> Self {
        Self {
            agreements: Mutex::new(vec![agreement]),
            ..Self::default()
        }
    }

    pub fn with_customer(customer: Customer) -> Self {
        Self {
            customers: vec![customer],
            ..Self::default()
        }
    }
}

#[async_trait]
impl AgreementRepository for FakeAgreements {
    async fn find_customer_by_mobile(
        &self,
        mobile: &MobileNumber,
    ) -> AppResult<Option<Customer>> {
        Ok(self
            .customers
            .iter()
            .find(|customer| &customer.mobile == mobile)
            .cloned())
    }

    async fn create_agreement(&self, agreement: NewAgreement) -> AppResult<Agreement> {
        if self.reject_creates {
            return Err(AppError::Validation("tenant mobile is blacklisted".to_owned()));
        }

        self.created.lock().await.push(agreement.clone());
        let mut agreements = self.agreements.lock().await;
        let id = i64::try_from(agreements.len()).unwrap_or_default() + 1;
        let created = Agreement {
            id: AgreementId::new(id),
            agreement_number: format!("AGR-2025-{id:04}"),
            status: AgreementStatus::Draft,
            owner: agreement.owner,
            tenant: agreement.tenant,
            property: agreement.property,
            terms: agreement.terms,
            language: agreement.language,
        };
        agreements.push(created.clone());
        Ok(created)
    }

    async fn find_agreement(&self, agreement_id: AgreementId) -> AppResult<Agreement> {
        self.agreements
            .lock()
            .await
            .iter()
            .find(|agreement| agreement.id == agreement_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("agreement '{agreement_id}'")))
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    pub requests: Mutex<Vec<DocumentRequest>>,
}

#[async_trait]
impl DocumentRenderer for FakeRenderer {
    async fn render(&self, request: DocumentRequest) -> AppResult<RenderedDocument> {
        let format = request.format;
        self.requests.lock().await.push(request);
        Ok(RenderedDocument {
            format,
            content_type: format.default_content_type().to_owned(),
            bytes: b"%PDF-1.7".to_vec(),
        })
    }
}
