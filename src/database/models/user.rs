use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::content::FieldErrors;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub user_type_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public shape of a user, as returned by the admin API
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub user_type_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            user_type_id: user.user_type_id,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    /// Required on create; on update an absent password keeps the current one
    pub password: Option<String>,
    pub user_type_id: Option<Uuid>,
    pub active: Option<bool>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl UserInput {
    pub fn validate(&self, creating: bool, min_password_length: usize) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name".into(), "Name is required".into());
        }

        let email = normalize_email(&self.email);
        let well_formed = email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
            .unwrap_or(false);
        if !well_formed {
            errors.insert("email".into(), "A valid email address is required".into());
        }

        match self.password.as_deref() {
            Some(p) if p.chars().count() < min_password_length => {
                errors.insert(
                    "password".into(),
                    format!("Password must be at least {} characters", min_password_length),
                );
            }
            None if creating => {
                errors.insert("password".into(), "Password is required".into());
            }
            _ => {}
        }

        if self.user_type_id.is_none() {
            errors.insert("user_type_id".into(), "User type is required".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl User {
    /// Build from already validated input and a hashed password
    pub fn new(input: &UserInput, user_type_id: Uuid, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            password_hash,
            user_type_id,
            active: input.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: &UserInput, user_type_id: Uuid, password_hash: Option<String>, now: DateTime<Utc>) {
        self.name = input.name.trim().to_string();
        self.email = normalize_email(&input.email);
        self.user_type_id = user_type_id;
        if let Some(hash) = password_hash {
            self.password_hash = hash;
        }
        if let Some(active) = input.active {
            self.active = active;
        }
        self.updated_at = now;
    }
}
