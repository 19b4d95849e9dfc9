use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{
    non_empty, tags, validate_common, ContentRecord, CrudPermissions, EditableContent, FieldErrors,
    BLOG_PERMISSIONS,
};
use crate::types::ContentKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub publish_date: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub publish_date: DateTime<Utc>,
}

/// Create/update payload from the admin API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlogInput {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}

impl BlogInput {
    fn validate(&self) -> Result<(String, Option<String>), FieldErrors> {
        let mut errors = FieldErrors::new();
        let image_url = non_empty(self.image_url.clone());
        let slug = validate_common(&mut errors, &self.title, self.slug.as_deref(), &self.content, image_url.as_deref());

        if self.author.trim().is_empty() {
            errors.insert("author".into(), "Author is required".into());
        }

        if errors.is_empty() {
            Ok((slug, image_url))
        } else {
            Err(errors)
        }
    }
}

impl ContentRecord for Blog {
    const KIND: ContentKind = ContentKind::Blog;
    type Summary = BlogSummary;

    fn id(&self) -> Uuid {
        self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn ranking_timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.publish_date)
    }

    fn listing_timestamp(&self) -> DateTime<Utc> {
        self.publish_date
    }

    fn summary(&self) -> BlogSummary {
        BlogSummary {
            id: self.id,
            slug: self.slug.clone(),
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            author: self.author.clone(),
            image_url: self.image_url.clone(),
            tags: self.tags.clone(),
            publish_date: self.publish_date,
        }
    }
}

impl EditableContent for Blog {
    type Input = BlogInput;

    const PERMISSIONS: CrudPermissions = BLOG_PERMISSIONS;

    fn from_input(input: BlogInput, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        let (slug, image_url) = input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            slug,
            title: input.title.trim().to_string(),
            excerpt: input.excerpt.trim().to_string(),
            content: input.content,
            author: input.author.trim().to_string(),
            image_url,
            tags: tags::normalize(input.tags),
            publish_date: input.publish_date.unwrap_or(now),
            active: input.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_input(&mut self, input: BlogInput, now: DateTime<Utc>) -> Result<(), FieldErrors> {
        // Keep the stored slug unless a new one is given
        let mut input = input;
        if non_empty(input.slug.clone()).is_none() {
            input.slug = Some(self.slug.clone());
        }
        let (slug, image_url) = input.validate()?;

        self.slug = slug;
        self.title = input.title.trim().to_string();
        self.excerpt = input.excerpt.trim().to_string();
        self.content = input.content;
        self.author = input.author.trim().to_string();
        self.image_url = image_url;
        self.tags = tags::normalize(input.tags);
        if let Some(date) = input.publish_date {
            self.publish_date = date;
        }
        if let Some(active) = input.active {
            self.active = active;
        }
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BlogInput {
        BlogInput {
            title: "Shipping Rust at Scale".into(),
            content: "Body".into(),
            author: "Sam".into(),
            tags: vec!["rust".into(), " rust ".into(), "ops".into()],
            ..Default::default()
        }
    }

    #[test]
    fn creates_with_defaults() {
        let now = Utc::now();
        let blog = Blog::from_input(input(), now).unwrap();
        assert_eq!(blog.slug, "shipping-rust-at-scale");
        assert_eq!(blog.tags, vec!["rust", "ops"]);
        assert_eq!(blog.publish_date, now);
        assert!(blog.active);
    }

    #[test]
    fn requires_author() {
        let errors = Blog::from_input(BlogInput { author: " ".into(), ..input() }, Utc::now()).unwrap_err();
        assert!(errors.contains_key("author"));
    }

    #[test]
    fn update_keeps_slug_and_flags() {
        let now = Utc::now();
        let mut blog = Blog::from_input(input(), now).unwrap();
        blog.active = false;

        let later = now + chrono::Duration::minutes(5);
        blog.apply_input(BlogInput { title: "Renamed".into(), ..input() }, later).unwrap();
        assert_eq!(blog.slug, "shipping-rust-at-scale");
        assert_eq!(blog.title, "Renamed");
        assert!(!blog.active);
        assert_eq!(blog.updated_at, later);
    }
}
