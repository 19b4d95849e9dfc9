use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{non_empty, FieldErrors};
use crate::permissions;

/// A role. Users hold exactly the permissions of their user type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserTypeInput {
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub active: Option<bool>,
}

impl UserTypeInput {
    /// Validated, de-duplicated permission list in input order
    fn validate(&self) -> Result<Vec<String>, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name".into(), "Name is required".into());
        }

        let unknown: Vec<&str> = self
            .permissions
            .iter()
            .map(String::as_str)
            .filter(|p| !permissions::is_known(p))
            .collect();
        if !unknown.is_empty() {
            errors.insert("permissions".into(), format!("Unknown permissions: {}", unknown.join(", ")));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut granted: Vec<String> = Vec::with_capacity(self.permissions.len());
        for p in &self.permissions {
            if !granted.contains(p) {
                granted.push(p.clone());
            }
        }
        Ok(granted)
    }
}

impl UserType {
    pub fn from_input(input: UserTypeInput, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        let permissions = input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: non_empty(input.description),
            permissions,
            active: input.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_input(&mut self, input: UserTypeInput, now: DateTime<Utc>) -> Result<(), FieldErrors> {
        let permissions = input.validate()?;
        self.name = input.name.trim().to_string();
        self.description = non_empty(input.description);
        self.permissions = permissions;
        if let Some(active) = input.active {
            self.active = active;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Permissions in effect for members of this type
    pub fn effective_permissions(&self) -> Vec<String> {
        if self.active {
            self.permissions.clone()
        } else {
            Vec::new()
        }
    }
}
