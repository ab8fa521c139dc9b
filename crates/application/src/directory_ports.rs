mod cache;
mod overrides;
mod repository;

pub use cache::{CacheKey, CachedValue, DirectoryCache};
pub use overrides::OverrideRequest;
pub use repository::{DirectoryRepository, RoleInput};
