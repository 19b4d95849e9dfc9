use async_trait::async_trait;
use std::cmp::Reverse;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, ContentStore, ListFilter, Page, StoreError};
use crate::content::ContentRecord;
use crate::database::models::{Blog, CaseStudy, User, UserType};

/// In-process store with the same contract as `PgStore`
///
/// Operations spanning accounts take `users` before `user_types`.
#[derive(Default)]
pub struct MemoryStore {
    blogs: RwLock<Vec<Blog>>,
    case_studies: RwLock<Vec<CaseStudy>>,
    users: RwLock<Vec<User>>,
    user_types: RwLock<Vec<UserType>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Table access for one content kind held by `MemoryStore`
pub trait ContentTable: ContentRecord {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>>;
}

impl ContentTable for Blog {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.blogs
    }
}

impl ContentTable for CaseStudy {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.case_studies
    }
}

fn sorted_newest_first<T: ContentRecord>(rows: &[T]) -> Vec<T> {
    let mut rows = rows.to_vec();
    // stable: equal timestamps stay in insertion order
    rows.sort_by_key(|r| Reverse(r.listing_timestamp()));
    rows
}

#[async_trait]
impl<T: ContentTable> ContentStore<T> for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        Ok(T::table(self).read().await.iter().find(|r| r.id() == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<T>, StoreError> {
        Ok(T::table(self).read().await.iter().find(|r| r.slug() == slug).cloned())
    }

    async fn list(&self, filter: &ListFilter) -> Result<Page<T>, StoreError> {
        let rows = T::table(self).read().await;
        let matching: Vec<T> = sorted_newest_first(&rows)
            .into_iter()
            .filter(|r| !filter.active_only || r.is_active())
            .filter(|r| match &filter.tag {
                Some(tag) => r.tags().iter().any(|t| t == tag),
                None => true,
            })
            .collect();

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .collect();
        Ok(Page { items, total })
    }

    async fn list_active_except(&self, id: Uuid) -> Result<Vec<T>, StoreError> {
        let rows = T::table(self).read().await;
        Ok(sorted_newest_first(&rows)
            .into_iter()
            .filter(|r| r.is_active() && r.id() != id)
            .collect())
    }

    async fn insert(&self, item: &T) -> Result<T, StoreError> {
        let mut rows = T::table(self).write().await;
        if rows.iter().any(|r| r.slug() == item.slug()) {
            return Err(StoreError::Conflict(format!("slug '{}' is already in use", item.slug())));
        }
        rows.push(item.clone());
        Ok(item.clone())
    }

    async fn update(&self, item: &T) -> Result<T, StoreError> {
        let mut rows = T::table(self).write().await;
        if rows.iter().any(|r| r.slug() == item.slug() && r.id() != item.id()) {
            return Err(StoreError::Conflict(format!("slug '{}' is already in use", item.slug())));
        }
        let row = rows
            .iter_mut()
            .find(|r| r.id() == item.id())
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", T::KIND, item.id())))?;
        *row = item.clone();
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = T::table(self).write().await;
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        Ok(rows.len() != before)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users = self.users.read().await.clone();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn insert_user(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if !self.user_types.read().await.iter().any(|t| t.id == user.user_type_id) {
            return Err(StoreError::NotFound(format!("user type {}", user.user_type_id)));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email '{}' is already registered", user.email)));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn update_user(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if !self.user_types.read().await.iter().any(|t| t.id == user.user_type_id) {
            return Err(StoreError::NotFound(format!("user type {}", user.user_type_id)));
        }
        if users.iter().any(|u| u.email == user.email && u.id != user.id) {
            return Err(StoreError::Conflict(format!("email '{}' is already registered", user.email)));
        }
        let row = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user.id)))?;
        *row = user.clone();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }

    async fn find_user_type(&self, id: Uuid) -> Result<Option<UserType>, StoreError> {
        Ok(self.user_types.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn list_user_types(&self) -> Result<Vec<UserType>, StoreError> {
        let mut types = self.user_types.read().await.clone();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn insert_user_type(&self, user_type: &UserType) -> Result<UserType, StoreError> {
        let mut types = self.user_types.write().await;
        if types.iter().any(|t| t.name == user_type.name) {
            return Err(StoreError::Conflict(format!("user type '{}' already exists", user_type.name)));
        }
        types.push(user_type.clone());
        Ok(user_type.clone())
    }

    async fn update_user_type(&self, user_type: &UserType) -> Result<UserType, StoreError> {
        let mut types = self.user_types.write().await;
        if types.iter().any(|t| t.name == user_type.name && t.id != user_type.id) {
            return Err(StoreError::Conflict(format!("user type '{}' already exists", user_type.name)));
        }
        let row = types
            .iter_mut()
            .find(|t| t.id == user_type.id)
            .ok_or_else(|| StoreError::NotFound(format!("user type {}", user_type.id)))?;
        *row = user_type.clone();
        Ok(user_type.clone())
    }

    async fn delete_user_type(&self, id: Uuid) -> Result<bool, StoreError> {
        let users = self.users.read().await;
        if users.iter().any(|u| u.user_type_id == id) {
            return Err(StoreError::Conflict("user type is still assigned to users".into()));
        }
        let mut types = self.user_types.write().await;
        let before = types.len();
        types.retain(|t| t.id != id);
        Ok(types.len() != before)
    }

    async fn count_users_with_type(&self, user_type_id: Uuid) -> Result<u64, StoreError> {
        Ok(self.users.read().await.iter().filter(|u| u.user_type_id == user_type_id).count() as u64)
    }

    async fn permissions_for_user(&self, user_id: Uuid) -> Result<Option<Vec<String>>, StoreError> {
        let users = self.users.read().await;
        let Some(user) = users.iter().find(|u| u.id == user_id && u.active) else {
            return Ok(None);
        };
        let types = self.user_types.read().await;
        Ok(Some(
            types
                .iter()
                .find(|t| t.id == user.user_type_id)
                .map(UserType::effective_permissions)
                .unwrap_or_default(),
        ))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
