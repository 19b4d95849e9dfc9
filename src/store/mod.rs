//! Persistence seams. Handlers, the recommender and the permission adapter
//! only see these traits; `PgStore` backs production and `MemoryStore` backs
//! tests and the `--memory` development mode.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::content::ContentRecord;
use crate::database::models::{User, UserType};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Listing options shared by every content kind
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub active_only: bool,
    pub tag: Option<String>,
    pub offset: u32,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[async_trait]
pub trait ContentStore<T: ContentRecord>: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<T>, StoreError>;

    /// Newest first (publish date for blogs, creation date for case studies)
    async fn list(&self, filter: &ListFilter) -> Result<Page<T>, StoreError>;

    /// Every active item except `id`, in listing order. Candidate pool for
    /// related-content ranking.
    async fn list_active_except(&self, id: Uuid) -> Result<Vec<T>, StoreError>;

    /// Fails with `Conflict` on a duplicate slug
    async fn insert(&self, item: &T) -> Result<T, StoreError>;

    /// Fails with `NotFound` if the id is gone, `Conflict` on a duplicate slug
    async fn update(&self, item: &T) -> Result<T, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Fails with `Conflict` on a duplicate email
    async fn insert_user(&self, user: &User) -> Result<User, StoreError>;

    async fn update_user(&self, user: &User) -> Result<User, StoreError>;

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn find_user_type(&self, id: Uuid) -> Result<Option<UserType>, StoreError>;

    async fn list_user_types(&self) -> Result<Vec<UserType>, StoreError>;

    /// Fails with `Conflict` on a duplicate name
    async fn insert_user_type(&self, user_type: &UserType) -> Result<UserType, StoreError>;

    async fn update_user_type(&self, user_type: &UserType) -> Result<UserType, StoreError>;

    async fn delete_user_type(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn count_users_with_type(&self, user_type_id: Uuid) -> Result<u64, StoreError>;

    /// Current permissions of an active user, read from the authoritative
    /// store. `None` if the user is missing or inactive; empty if the user's
    /// type is inactive.
    async fn permissions_for_user(&self, user_id: Uuid) -> Result<Option<Vec<String>>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
