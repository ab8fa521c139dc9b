use std::sync::Arc;

use crate::test_fixtures::{FakeCache, FakeDirectory, manager_user, user_id};
use crate::{CacheKey, DirectoryQueryService};

fn service(ttl_seconds: u32) -> (DirectoryQueryService, Arc<FakeDirectory>, Arc<FakeCache>) {
    let directory = Arc::new(FakeDirectory::with_user(manager_user()));
    let cache = Arc::new(FakeCache::default());
    let service = DirectoryQueryService::new(directory.clone(), cache.clone(), ttl_seconds);
    (service, directory, cache)
}

#[tokio::test]
async fn repeated_reads_are_served_from_cache() {
    let (service, directory, _) = service(60);

    assert!(service.users().await.is_ok());
    assert!(service.users().await.is_ok());
    assert!(service.roles().await.is_ok());
    assert!(service.roles().await.is_ok());

    assert_eq!(directory.read_count().await, 2);
}

#[tokio::test]
async fn zero_ttl_disables_caching() {
    let (service, directory, cache) = service(0);

    assert!(service.users().await.is_ok());
    assert!(service.users().await.is_ok());

    assert_eq!(directory.read_count().await, 2);
    assert!(cache.entries.lock().await.is_empty());
}

#[tokio::test]
async fn invalidate_user_forces_refetch() {
    let (service, directory, _) = service(60);
    let id = user_id("u-1");

    assert!(service.user(&id).await.is_ok());
    service.invalidate_user(&id).await;
    assert!(service.user(&id).await.is_ok());

    assert_eq!(directory.read_count().await, 2);
}

#[tokio::test]
async fn permission_bearing_invalidation_keeps_permission_list() {
    let (service, _, cache) = service(60);

    assert!(service.permissions().await.is_ok());
    assert!(service.roles().await.is_ok());
    assert!(service.users().await.is_ok());
    assert!(service.user(&user_id("u-1")).await.is_ok());

    let dropped = service.invalidate_permission_bearing().await;

    assert_eq!(dropped, 3);
    let entries = cache.entries.lock().await;
    assert_eq!(entries.len(), 1);
    assert!(entries.contains_key(&CacheKey::Permissions));
}

#[tokio::test]
async fn categories_group_catalog() {
    let (service, _, _) = service(60);

    let categories = service.categories().await.unwrap_or_default();
    let names: Vec<&str> = categories.iter().map(|category| category.name()).collect();
    assert_eq!(names, vec!["Agreements", "Users"]);
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let (service, _, _) = service(60);

    let result = service.user(&user_id("ghost")).await;
    assert!(result.is_err_and(|error| error.is_not_found()));
}
