use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::auth::AuthUser;
use crate::app::AppState;
use crate::error::ApiError;
use crate::permissions::{self, PermissionSet, Required};

/// The authenticated user with permissions freshly read from the store.
///
/// Extracting this performs the lookup on every request, so role edits and
/// deactivations take effect without the user logging in again.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub user_type_id: Uuid,
    pub permissions: PermissionSet,
}

impl CurrentUser {
    /// 403 unless the held permissions satisfy `required`
    pub fn require<'a>(&self, required: impl Into<Required<'a>>) -> Result<(), ApiError> {
        permissions::require_permission(&self.permissions, required).map_err(|e| {
            tracing::warn!("Permission denied for {}: {}", self.email, e);
            ApiError::from(e)
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Set by jwt_auth_middleware
        let auth_user = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let user = state
            .accounts
            .find_user(auth_user.user_id)
            .await?
            .filter(|u| u.active)
            .ok_or_else(|| {
                tracing::warn!("Session for {} rejected: user missing or inactive", auth_user.email);
                ApiError::unauthorized("Session is no longer valid")
            })?;

        let held = state
            .accounts
            .permissions_for_user(user.id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Session is no longer valid"))?;

        tracing::debug!("Resolved {} with {} permissions", user.email, held.len());

        Ok(CurrentUser {
            id: user.id,
            name: user.name,
            email: user.email,
            user_type_id: user.user_type_id,
            permissions: held.into_iter().collect(),
        })
    }
}
