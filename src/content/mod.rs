pub mod related;
pub mod slug;
pub mod tags;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::permissions;
use crate::types::ContentKind;

pub use related::{OverlapMode, RelatedContent, ScoredCandidate};

/// Field name -> message, surfaced as `field_errors` on validation failures
pub type FieldErrors = HashMap<String, String>;

/// A publishable, taggable record (blog post or case study)
pub trait ContentRecord: Clone + Send + Sync + Serialize + 'static {
    const KIND: ContentKind;

    /// Lightweight shape used by listings and related-content blocks
    type Summary: Serialize + Send;

    fn id(&self) -> Uuid;
    fn slug(&self) -> &str;
    fn tags(&self) -> &[String];
    fn is_active(&self) -> bool;

    /// Tiebreak for related-content ranking, most recent first.
    /// `None` keeps candidates in fetch order.
    fn ranking_timestamp(&self) -> Option<DateTime<Utc>>;

    /// Ordering key for listings, newest first
    fn listing_timestamp(&self) -> DateTime<Utc>;

    fn summary(&self) -> Self::Summary;
}

/// Admin permissions guarding one content kind
#[derive(Debug, Clone, Copy)]
pub struct CrudPermissions {
    pub view: &'static str,
    pub create: &'static str,
    pub edit: &'static str,
    pub delete: &'static str,
}

/// Content that can be created and edited through the admin API
pub trait EditableContent: ContentRecord {
    type Input: DeserializeOwned + Send + 'static;

    const PERMISSIONS: CrudPermissions;

    fn from_input(input: Self::Input, now: DateTime<Utc>) -> Result<Self, FieldErrors>;

    /// Full replacement of editable fields; omitted optional fields keep
    /// their current value.
    fn apply_input(&mut self, input: Self::Input, now: DateTime<Utc>) -> Result<(), FieldErrors>;
}

pub const BLOG_PERMISSIONS: CrudPermissions = CrudPermissions {
    view: permissions::BLOGS_VIEW,
    create: permissions::BLOGS_CREATE,
    edit: permissions::BLOGS_EDIT,
    delete: permissions::BLOGS_DELETE,
};

pub const CASE_STUDY_PERMISSIONS: CrudPermissions = CrudPermissions {
    view: permissions::CASE_STUDIES_VIEW,
    create: permissions::CASE_STUDIES_CREATE,
    edit: permissions::CASE_STUDIES_EDIT,
    delete: permissions::CASE_STUDIES_DELETE,
};

const MAX_TITLE_LENGTH: usize = 200;

/// Checks shared by every content kind. Returns the resolved slug.
pub(crate) fn validate_common(
    errors: &mut FieldErrors,
    title: &str,
    slug: Option<&str>,
    content: &str,
    image_url: Option<&str>,
) -> String {
    if title.trim().is_empty() {
        errors.insert("title".into(), "Title is required".into());
    } else if title.chars().count() > MAX_TITLE_LENGTH {
        errors.insert("title".into(), format!("Title must be at most {} characters", MAX_TITLE_LENGTH));
    }

    if content.trim().is_empty() {
        errors.insert("content".into(), "Content is required".into());
    }

    let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => {
            if !slug::is_valid(s) {
                errors.insert(
                    "slug".into(),
                    "Slug may only contain lowercase letters, digits and single hyphens".into(),
                );
            }
            s.to_string()
        }
        None => slug::slugify(title),
    };
    if slug.is_empty() && !errors.contains_key("title") {
        errors.insert("slug".into(), "Could not derive a slug from the title".into());
    }

    if let Some(url) = image_url {
        if !is_acceptable_image_url(url) {
            errors.insert("image_url".into(), "Image URL must be absolute http(s) or a site path".into());
        }
    }

    slug
}

fn is_acceptable_image_url(value: &str) -> bool {
    if value.starts_with('/') && !value.starts_with("//") {
        return true;
    }
    match url::Url::parse(value) {
        Ok(u) => matches!(u.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_slug_from_title() {
        let mut errors = FieldErrors::new();
        let slug = validate_common(&mut errors, "Hello, World!", None, "body", None);
        assert_eq!(slug, "hello-world");
        assert!(errors.is_empty());
    }

    #[test]
    fn rejects_bad_input() {
        let mut errors = FieldErrors::new();
        validate_common(&mut errors, " ", Some("Bad Slug"), "", Some("ftp://x/y.png"));
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("slug"));
        assert!(errors.contains_key("content"));
        assert!(errors.contains_key("image_url"));
    }

    #[test]
    fn image_urls() {
        assert!(is_acceptable_image_url("/uploads/a.webp"));
        assert!(is_acceptable_image_url("https://cdn.example.com/a.webp"));
        assert!(!is_acceptable_image_url("//cdn.example.com/a.webp"));
        assert!(!is_acceptable_image_url("javascript:alert(1)"));
    }
}
