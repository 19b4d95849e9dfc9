use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{
    non_empty, tags, validate_common, ContentRecord, CrudPermissions, EditableContent, FieldErrors,
    CASE_STUDY_PERMISSIONS,
};
use crate::types::ContentKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub client: String,
    pub summary: String,
    pub content: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseStudySummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub client: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CaseStudyInput {
    pub title: String,
    pub slug: Option<String>,
    pub client: String,
    pub summary: String,
    pub content: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub active: Option<bool>,
}

impl CaseStudyInput {
    fn validate(&self) -> Result<(String, Option<String>), FieldErrors> {
        let mut errors = FieldErrors::new();
        let image_url = non_empty(self.image_url.clone());
        let slug = validate_common(&mut errors, &self.title, self.slug.as_deref(), &self.content, image_url.as_deref());

        if self.client.trim().is_empty() {
            errors.insert("client".into(), "Client is required".into());
        }

        if errors.is_empty() {
            Ok((slug, image_url))
        } else {
            Err(errors)
        }
    }
}

impl ContentRecord for CaseStudy {
    const KIND: ContentKind = ContentKind::CaseStudy;
    type Summary = CaseStudySummary;

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
        None
    }

    fn listing_timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn summary(&self) -> CaseStudySummary {
        CaseStudySummary {
            id: self.id,
            slug: self.slug.clone(),
            title: self.title.clone(),
            client: self.client.clone(),
            image_url: self.image_url.clone(),
            tags: self.tags.clone(),
        }
    }
}

impl EditableContent for CaseStudy {
    type Input = CaseStudyInput;

    const PERMISSIONS: CrudPermissions = CASE_STUDY_PERMISSIONS;

    fn from_input(input: CaseStudyInput, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        let (slug, image_url) = input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            slug,
            title: input.title.trim().to_string(),
            client: input.client.trim().to_string(),
            summary: input.summary.trim().to_string(),
            content: input.content,
            image_url,
            tags: tags::normalize(input.tags),
            active: input.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_input(&mut self, input: CaseStudyInput, now: DateTime<Utc>) -> Result<(), FieldErrors> {
        let mut input = input;
        if non_empty(input.slug.clone()).is_none() {
            input.slug = Some(self.slug.clone());
        }
        let (slug, image_url) = input.validate()?;

        self.slug = slug;
        self.title = input.title.trim().to_string();
        self.client = input.client.trim().to_string();
        self.summary = input.summary.trim().to_string();
        self.content = input.content;
        self.image_url = image_url;
        self.tags = tags::normalize(input.tags);
        if let Some(active) = input.active {
            self.active = active;
        }
        self.updated_at = now;
        Ok(())
    }
}
