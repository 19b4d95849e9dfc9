// handlers/protected/user_types.rs - /api/admin/user-types CRUD and the permission catalog

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{UserType, UserTypeInput};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::permissions::{self, PermissionGroup, CATALOG};

#[derive(Debug, Serialize)]
pub struct UserTypeView {
    #[serde(flatten)]
    pub user_type: UserType,
    pub user_count: u64,
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("User type {} not found", id))
}

/// GET /api/admin/permissions - Everything a user type can be granted.
/// Anyone who can see or edit roles may read it.
pub async fn catalog(user: CurrentUser) -> ApiResult<&'static [PermissionGroup]> {
    user.require(&[
        permissions::USER_TYPES_VIEW,
        permissions::USER_TYPES_CREATE,
        permissions::USER_TYPES_EDIT,
    ])?;

    Ok(ApiResponse::success(CATALOG))
}

/// GET /api/admin/user-types - With the number of users holding each type
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<UserTypeView>> {
    user.require(permissions::USER_TYPES_VIEW)?;

    let types = state.accounts.list_user_types().await?;
    let mut views = Vec::with_capacity(types.len());
    for user_type in types {
        let user_count = state.accounts.count_users_with_type(user_type.id).await?;
        views.push(UserTypeView { user_type, user_count });
    }

    Ok(ApiResponse::success(views))
}

/// GET /api/admin/user-types/:id
pub async fn show(State(state): State<AppState>, user: CurrentUser, Path(id): Path<Uuid>) -> ApiResult<UserTypeView> {
    user.require(permissions::USER_TYPES_VIEW)?;

    let user_type = state.accounts.find_user_type(id).await?.ok_or_else(|| not_found(id))?;
    let user_count = state.accounts.count_users_with_type(id).await?;

    Ok(ApiResponse::success(UserTypeView { user_type, user_count }))
}

/**
 * POST /api/admin/user-types - Create a role
 *
 * ```json
 * { "name": "Editor", "permissions": ["blogs.view", "blogs.edit"] }
 * ```
 *
 * Permissions outside the catalog are rejected with a field error.
 */
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<UserTypeInput>,
) -> ApiResult<UserType> {
    user.require(permissions::USER_TYPES_CREATE)?;

    let user_type = UserType::from_input(input, Utc::now()).map_err(ApiError::invalid_fields)?;
    let created = state.accounts.insert_user_type(&user_type).await?;

    tracing::info!("{} created user type '{}'", user.email, created.name);
    Ok(ApiResponse::created(created))
}

/// PUT /api/admin/user-types/:id - Takes effect on members' next request
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UserTypeInput>,
) -> ApiResult<UserType> {
    user.require(permissions::USER_TYPES_EDIT)?;

    let mut user_type = state.accounts.find_user_type(id).await?.ok_or_else(|| not_found(id))?;
    user_type.apply_input(input, Utc::now()).map_err(ApiError::invalid_fields)?;
    let updated = state.accounts.update_user_type(&user_type).await?;

    tracing::info!(
        "{} updated user type '{}' ({} permissions)",
        user.email,
        updated.name,
        updated.permissions.len()
    );
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/user-types/:id - 409 while users still hold the type
pub async fn delete(State(state): State<AppState>, user: CurrentUser, Path(id): Path<Uuid>) -> ApiResult<()> {
    user.require(permissions::USER_TYPES_DELETE)?;

    if !state.accounts.delete_user_type(id).await? {
        return Err(not_found(id));
    }

    tracing::info!("{} deleted user type {}", user.email, id);
    Ok(ApiResponse::no_content())
}
