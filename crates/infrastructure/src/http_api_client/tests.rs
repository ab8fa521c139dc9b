use std::collections::BTreeSet;

use leasedesk_application::RoleInput;
use leasedesk_core::NonEmptyString;
use leasedesk_domain::{PermissionCatalog, PermissionId, UserId};
use reqwest::{Method, header};
use serde_json::json;

use super::HttpApiClient;
use super::dto::{PermissionDto, RoleBody, RoleDto, UserDto};

fn catalog() -> PermissionCatalog {
    let permissions: Vec<PermissionDto> = serde_json::from_value(json!([
        {"id": 1, "name": "agreement.view.own", "description": "View own", "category": "Agreements"},
        {"id": 2, "name": "agreement.view.all", "category": "Agreements"},
        {"id": 3, "name": "agreement.edit.own", "category": "Agreements"},
        {"id": 6, "name": "user.manage"}
    ]))
    .unwrap_or_default();

    let permissions = permissions
        .into_iter()
        .filter_map(|permission| permission.into_permission().ok())
        .collect();
    PermissionCatalog::new(permissions).unwrap_or_default()
}

fn pid(value: i64) -> PermissionId {
    PermissionId::new(value)
}

#[test]
fn permission_without_category_lands_in_general() {
    let catalog = catalog();

    assert_eq!(catalog.len(), 4);
    assert_eq!(
        catalog.get(pid(6)).map(|permission| permission.category()),
        Some("General")
    );
}

#[test]
fn role_permission_names_resolve_through_catalog() {
    let dto: Result<RoleDto, _> = serde_json::from_value(json!({
        "id": 10,
        "name": "Manager",
        "permissions": ["agreement.view.own", "agreement.edit.own", "agreement.delete"]
    }));

    let role = dto
        .ok()
        .and_then(|dto| dto.into_role(&catalog()).ok());

    assert_eq!(
        role.map(|role| role.permissions().clone()),
        Some(BTreeSet::from([pid(1), pid(3)]))
    );
}

#[test]
fn user_accepts_numeric_id_and_mixed_override_references() {
    let dto: Result<UserDto, _> = serde_json::from_value(json!({
        "id": 7,
        "username": "priya",
        "name": "Priya Nair",
        "roles": [{"id": 10, "name": "Manager", "permissions": ["agreement.view.own", "agreement.edit.own"]}],
        "manualPermissions": {"added": [2], "removed": ["agreement.edit.own"]}
    }));

    let user = dto.ok().and_then(|dto| dto.into_user(&catalog()).ok());
    let Some(user) = user else {
        panic!("user payload should convert");
    };

    assert_eq!(user.id().as_str(), "7");
    assert_eq!(
        user.effective_permissions(),
        BTreeSet::from([pid(1), pid(2)])
    );
}

#[test]
fn user_with_missing_optional_fields_defaults() {
    let dto: Result<UserDto, _> = serde_json::from_value(json!({"id": "u-9"}));

    let user = dto.ok().and_then(|dto| dto.into_user(&catalog()).ok());

    assert_eq!(
        user.map(|user| (user.roles().len(), user.effective_permissions().len())),
        Some((0, 0))
    );
}

#[test]
fn role_body_sends_permission_codes() {
    let input = RoleInput {
        name: NonEmptyString::new("Auditor").unwrap_or_else(|error| panic!("{error}")),
        description: None,
        permissions: BTreeSet::from([pid(2), pid(6)]),
    };

    let body = RoleBody::from_input(&input, &catalog())
        .ok()
        .and_then(|body| serde_json::to_value(body).ok());

    assert_eq!(
        body,
        Some(json!({
            "name": "Auditor",
            "description": null,
            "permissions": ["agreement.view.all", "user.manage"]
        }))
    );
}

#[test]
fn role_body_rejects_unknown_permission_ids() {
    let input = RoleInput {
        name: NonEmptyString::new("Auditor").unwrap_or_else(|error| panic!("{error}")),
        description: None,
        permissions: BTreeSet::from([pid(99)]),
    };

    assert!(RoleBody::from_input(&input, &catalog()).is_err());
}

#[test]
fn requests_carry_bearer_token_and_trimmed_base() {
    let client = HttpApiClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:5000/api/",
        Some("secret".to_owned()),
    );
    let user_id = UserId::new("u-1").unwrap_or_else(|error| panic!("{error}"));

    let request = client
        .url(&format!("/users/{user_id}/permission-overrides"))
        .ok()
        .and_then(|url| client.request(Method::POST, url).build().ok());
    let Some(request) = request else {
        panic!("request should build");
    };

    assert_eq!(
        request.url().as_str(),
        "http://127.0.0.1:5000/api/users/u-1/permission-overrides"
    );
    assert_eq!(
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
        Some("Bearer secret")
    );
}

#[test]
fn blank_token_is_not_sent() {
    let client = HttpApiClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:5000/api",
        Some("  ".to_owned()),
    );

    let request = client
        .url("/users")
        .ok()
        .and_then(|url| client.request(Method::GET, url).build().ok());

    assert!(
        request.is_some_and(|request| request.headers().get(header::AUTHORIZATION).is_none())
    );
}
