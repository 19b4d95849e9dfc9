//! Fixture builders for unit tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::content::ContentRecord;
use crate::database::models::{Blog, CaseStudy, User, UserType};
use crate::store::{ContentStore, ListFilter, Page, StoreError};

/// Fixed reference point so ordering assertions are deterministic
pub fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Active blog published `days_ago` days before [`base_date`]
pub fn blog(slug: &str, tags: &[&str], days_ago: i64) -> Blog {
    let published = base_date() - Duration::days(days_ago);
    Blog {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: format!("Post {}", slug),
        excerpt: String::new(),
        content: "Body".to_string(),
        author: "Staff".to_string(),
        image_url: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        publish_date: published,
        active: true,
        created_at: published,
        updated_at: published,
    }
}

pub fn case_study(slug: &str, tags: &[&str]) -> CaseStudy {
    CaseStudy {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: format!("Case {}", slug),
        client: "Acme".to_string(),
        summary: String::new(),
        content: "Body".to_string(),
        image_url: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        active: true,
        created_at: base_date(),
        updated_at: base_date(),
    }
}

pub fn user_type(name: &str, permissions: &[&str]) -> UserType {
    UserType {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        active: true,
        created_at: base_date(),
        updated_at: base_date(),
    }
}

/// Active user with a placeholder hash; not usable for login
pub fn user(email: &str, user_type_id: Uuid) -> User {
    User {
        id: Uuid::new_v4(),
        name: email.split('@').next().unwrap_or(email).to_string(),
        email: email.to_string(),
        password_hash: "not-a-hash".to_string(),
        user_type_id,
        active: true,
        created_at: base_date(),
        updated_at: base_date(),
    }
}

/// Store whose every call fails as if the pool were exhausted
pub struct FailingStore;

fn unavailable<T>() -> Result<T, StoreError> {
    Err(StoreError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl<T: ContentRecord> ContentStore<T> for FailingStore {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<T>, StoreError> {
        unavailable()
    }

    async fn find_by_slug(&self, _slug: &str) -> Result<Option<T>, StoreError> {
        unavailable()
    }

    async fn list(&self, _filter: &ListFilter) -> Result<Page<T>, StoreError> {
        unavailable()
    }

    async fn list_active_except(&self, _id: Uuid) -> Result<Vec<T>, StoreError> {
        unavailable()
    }

    async fn insert(&self, _item: &T) -> Result<T, StoreError> {
        unavailable()
    }

    async fn update(&self, _item: &T) -> Result<T, StoreError> {
        unavailable()
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, StoreError> {
        unavailable()
    }
}

/// Store that finds one reference record but fails to read the candidate pool
pub struct FailingPoolStore<T> {
    pub reference: T,
}

#[async_trait]
impl<T: ContentRecord> ContentStore<T> for FailingPoolStore<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        Ok((self.reference.id() == id).then(|| self.reference.clone()))
    }

    async fn find_by_slug(&self, _slug: &str) -> Result<Option<T>, StoreError> {
        unavailable()
    }

    async fn list(&self, _filter: &ListFilter) -> Result<Page<T>, StoreError> {
        unavailable()
    }

    async fn list_active_except(&self, _id: Uuid) -> Result<Vec<T>, StoreError> {
        unavailable()
    }

    async fn insert(&self, _item: &T) -> Result<T, StoreError> {
        unavailable()
    }

    async fn update(&self, _item: &T) -> Result<T, StoreError> {
        unavailable()
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, StoreError> {
        unavailable()
    }
}
