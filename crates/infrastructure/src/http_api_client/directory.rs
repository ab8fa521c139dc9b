use async_trait::async_trait;
use leasedesk_application::{DirectoryRepository, RoleInput};
use leasedesk_core::AppResult;
use leasedesk_domain::{Permission, PermissionCatalog, PermissionId, Role, RoleId, User, UserId};
use reqwest::Method;
use tracing::debug;

use super::dto::{OverrideBody, PermissionDto, RoleBody, RoleDto, UserDto};
use super::{HttpApiClient, decode};

impl HttpApiClient {
    async fn catalog(&self) -> AppResult<PermissionCatalog> {
        if let Some(catalog) = self.cached_catalog().await {
            return Ok(catalog);
        }

        let permissions = self.list_permissions().await?;
        PermissionCatalog::new(permissions)
    }

    async fn send_role(
        &self,
        method: Method,
        path: &str,
        input: &RoleInput,
        context: &str,
    ) -> AppResult<Role> {
        let catalog = self.catalog().await?;
        let body = RoleBody::from_input(input, &catalog)?;
        let response = self
            .send(self.request(method, self.url(path)?).json(&body), context)
            .await?;
        decode::<RoleDto>(response, context)
            .await?
            .into_role(&catalog)
    }
}

#[async_trait]
impl DirectoryRepository for HttpApiClient {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let permissions = self
            .get_json::<Vec<PermissionDto>>(self.url("/permissions")?, "permission list")
            .await?
            .into_iter()
            .map(PermissionDto::into_permission)
            .collect::<AppResult<Vec<_>>>()?;

        self.store_catalog(PermissionCatalog::new(permissions.clone())?)
            .await;
        debug!(count = permissions.len(), "loaded permission catalog");
        Ok(permissions)
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let catalog = self.catalog().await?;
        self.get_json::<Vec<RoleDto>>(self.url("/roles")?, "role list")
            .await?
            .into_iter()
            .map(|role| role.into_role(&catalog))
            .collect()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let catalog = self.catalog().await?;
        self.get_json::<Vec<UserDto>>(self.url("/users")?, "user list")
            .await?
            .into_iter()
            .map(|user| user.into_user(&catalog))
            .collect()
    }

    async fn find_user(&self, user_id: &UserId) -> AppResult<User> {
        let catalog = self.catalog().await?;
        self.get_json::<UserDto>(self.url(&format!("/users/{user_id}"))?, "user lookup")
            .await?
            .into_user(&catalog)
    }

    async fn set_permission_override(
        &self,
        user_id: &UserId,
        permission_id: PermissionId,
        granted: bool,
    ) -> AppResult<()> {
        let url = self.url(&format!("/users/{user_id}/permission-overrides"))?;
        let body = OverrideBody {
            permission_id: permission_id.as_i64(),
            is_granted: granted,
        };
        self.send(
            self.request(Method::POST, url).json(&body),
            "permission override",
        )
        .await?;
        Ok(())
    }

    async fn clear_permission_override(
        &self,
        user_id: &UserId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let url = self.url(&format!(
            "/users/{user_id}/permission-overrides/{permission_id}"
        ))?;
        self.send(self.request(Method::DELETE, url), "permission override removal")
            .await?;
        Ok(())
    }

    async fn create_role(&self, input: RoleInput) -> AppResult<Role> {
        self.send_role(Method::POST, "/roles", &input, "role create")
            .await
    }

    async fn update_role(&self, role_id: RoleId, input: RoleInput) -> AppResult<Role> {
        self.send_role(
            Method::PUT,
            &format!("/roles/{role_id}"),
            &input,
            "role update",
        )
        .await
    }
}
