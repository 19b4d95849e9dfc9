// handlers/protected/users.rs - /api/admin/users CRUD

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::hash_password;
use crate::content::FieldErrors;
use crate::database::models::{User, UserInput, UserType, UserView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::permissions;

fn not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("User {} not found", id))
}

/// Validate the payload and resolve its user type, which must exist
async fn checked_user_type(state: &AppState, input: &UserInput, creating: bool) -> Result<UserType, ApiError> {
    input
        .validate(creating, state.config.security.min_password_length)
        .map_err(ApiError::invalid_fields)?;

    // validate() has already insisted on a type id
    let type_id = input.user_type_id.unwrap_or_default();
    state.accounts.find_user_type(type_id).await?.ok_or_else(|| {
        let mut errors = FieldErrors::new();
        errors.insert("user_type_id".into(), "Unknown user type".into());
        ApiError::invalid_fields(errors)
    })
}

/// A caller may only hand out, or manage holders of, permissions they hold themselves
fn ensure_grantable(user: &CurrentUser, user_type: &UserType) -> Result<(), ApiError> {
    let granted: Vec<&str> = user_type.permissions.iter().map(String::as_str).collect();
    if permissions::has_all_permissions(&user.permissions, &granted) {
        return Ok(());
    }
    tracing::warn!("{} tried to manage a user in {} beyond their own permissions", user.email, user_type.name);
    Err(ApiError::forbidden(format!(
        "User type {} grants permissions you do not hold",
        user_type.name
    )))
}

/// GET /api/admin/users
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<UserView>> {
    user.require(permissions::USERS_VIEW)?;

    let users = state.accounts.list_users().await?;
    Ok(ApiResponse::success(users.iter().map(UserView::from).collect()))
}

/// GET /api/admin/users/:id
pub async fn show(State(state): State<AppState>, user: CurrentUser, Path(id): Path<Uuid>) -> ApiResult<UserView> {
    user.require(permissions::USERS_VIEW)?;

    let found = state.accounts.find_user(id).await?.ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(UserView::from(&found)))
}

/**
 * POST /api/admin/users - Create an account
 *
 * ```json
 * { "name": "Dana", "email": "dana@example.com", "password": "...", "user_type_id": "uuid" }
 * ```
 */
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<UserInput>,
) -> ApiResult<UserView> {
    user.require(permissions::USERS_CREATE)?;

    let user_type = checked_user_type(&state, &input, true).await?;
    ensure_grantable(&user, &user_type)?;
    let hash = hash_password(input.password.as_deref().unwrap_or_default())?;

    let created = state
        .accounts
        .insert_user(&User::new(&input, user_type.id, hash, Utc::now()))
        .await?;

    tracing::info!("{} created user {}", user.email, created.email);
    Ok(ApiResponse::created(UserView::from(&created)))
}

/// PUT /api/admin/users/:id - Omit `password` to keep the current one
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UserInput>,
) -> ApiResult<UserView> {
    user.require(permissions::USERS_EDIT)?;

    if id == user.id && input.active == Some(false) {
        return Err(ApiError::bad_request("You cannot deactivate your own account"));
    }

    let mut existing = state.accounts.find_user(id).await?.ok_or_else(|| not_found(id))?;
    let user_type = checked_user_type(&state, &input, false).await?;
    ensure_grantable(&user, &user_type)?;
    if existing.user_type_id != user_type.id {
        if let Some(current) = state.accounts.find_user_type(existing.user_type_id).await? {
            ensure_grantable(&user, &current)?;
        }
    }

    let hash = match input.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    existing.apply(&input, user_type.id, hash, Utc::now());
    let updated = state.accounts.update_user(&existing).await?;

    tracing::info!("{} updated user {}", user.email, updated.email);
    Ok(ApiResponse::success(UserView::from(&updated)))
}

/// DELETE /api/admin/users/:id
pub async fn delete(State(state): State<AppState>, user: CurrentUser, Path(id): Path<Uuid>) -> ApiResult<()> {
    user.require(permissions::USERS_DELETE)?;

    if id == user.id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    if !state.accounts.delete_user(id).await? {
        return Err(not_found(id));
    }

    tracing::info!("{} deleted user {}", user.email, id);
    Ok(ApiResponse::no_content())
}
