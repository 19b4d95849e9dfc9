use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{hash_password, AuthError};
use crate::content::FieldErrors;
use crate::database::models::{normalize_email, User, UserInput, UserType, UserTypeInput};
use crate::permissions;
use crate::store::{AccountStore, StoreError};

/// Name of the all-permissions role created by [`AccountService::bootstrap_admin`]
pub const ADMINISTRATOR_TYPE: &str = "Administrator";

#[derive(Debug, thiserror::Error)]
pub enum AccountServiceError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Password hashing failed: {0}")]
    Auth(#[from] AuthError),
    #[error("Invalid input: {}", format_fields(.0))]
    Invalid(FieldErrors),
    #[error("User type not found: {0}")]
    UnknownUserType(String),
}

fn format_fields(errors: &FieldErrors) -> String {
    let mut parts: Vec<String> = errors.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
    parts.sort();
    parts.join("; ")
}

/// Account provisioning outside the HTTP API: the `cms` CLI and the
/// development admin seed in `--memory` mode.
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    min_password_length: usize,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStore>, min_password_length: usize) -> Self {
        Self {
            accounts,
            min_password_length,
        }
    }

    pub async fn create_user_type(
        &self,
        name: &str,
        description: Option<String>,
        permissions: Vec<String>,
    ) -> Result<UserType, AccountServiceError> {
        let input = UserTypeInput {
            name: name.to_string(),
            description,
            permissions,
            active: Some(true),
        };
        let user_type = UserType::from_input(input, Utc::now()).map_err(AccountServiceError::Invalid)?;
        Ok(self.accounts.insert_user_type(&user_type).await?)
    }

    /// Look a user type up by id or, case-insensitively, by name
    pub async fn resolve_user_type(&self, key: &str) -> Result<UserType, AccountServiceError> {
        if let Ok(id) = Uuid::parse_str(key) {
            if let Some(found) = self.accounts.find_user_type(id).await? {
                return Ok(found);
            }
        }

        self.accounts
            .list_user_types()
            .await?
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| AccountServiceError::UnknownUserType(key.to_string()))
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        user_type: &UserType,
    ) -> Result<User, AccountServiceError> {
        let input = UserInput {
            name: name.to_string(),
            email: email.to_string(),
            password: Some(password.to_string()),
            user_type_id: Some(user_type.id),
            active: Some(true),
        };
        input
            .validate(true, self.min_password_length)
            .map_err(AccountServiceError::Invalid)?;

        let hash = hash_password(password)?;
        let user = User::new(&input, user_type.id, hash, Utc::now());
        Ok(self.accounts.insert_user(&user).await?)
    }

    /// Ensure an Administrator role holding every permission and an account
    /// for `email` in it. Existing records are left untouched.
    pub async fn bootstrap_admin(&self, name: &str, email: &str, password: &str) -> Result<User, AccountServiceError> {
        let admin_type = match self.resolve_user_type(ADMINISTRATOR_TYPE).await {
            Ok(existing) => existing,
            Err(AccountServiceError::UnknownUserType(_)) => {
                let all = permissions::all().into_iter().map(String::from).collect();
                let created = self
                    .create_user_type(ADMINISTRATOR_TYPE, Some("Full access".to_string()), all)
                    .await?;
                tracing::info!("Created user type '{}'", created.name);
                created
            }
            Err(e) => return Err(e),
        };

        if let Some(existing) = self.accounts.find_user_by_email(&normalize_email(email)).await? {
            tracing::debug!("Admin account {} already exists", existing.email);
            return Ok(existing);
        }

        let user = self.create_user(name, email, password, &admin_type).await?;
        tracing::info!("Created admin account {}", user.email);
        Ok(user)
    }
}
