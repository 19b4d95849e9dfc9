// handlers/protected/content.rs - /api/admin/{blogs,case-studies} CRUD
//
// Generic over the content kind. Admin reads include inactive items.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::app::{AppState, ContentState};
use crate::content::EditableContent;
use crate::error::ApiError;
use crate::handlers::{ListQuery, Paginated};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

fn not_found<T: EditableContent>(id: Uuid) -> ApiError {
    ApiError::not_found(format!("{} {} not found", T::KIND.label(), id))
}

/// GET /api/admin/{kind} - Every item, active or not
pub async fn list<T>(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Paginated<T>>
where
    T: EditableContent,
    AppState: ContentState<T>,
{
    user.require(T::PERMISSIONS.view)?;

    let (filter, page, limit) = query.to_filter(&state.config.api, false);
    let result = ContentState::<T>::content_store(&state).list(&filter).await?;

    Ok(ApiResponse::success(Paginated::from_page(result, page, limit, |item| item)))
}

/// GET /api/admin/{kind}/:id
pub async fn show<T>(State(state): State<AppState>, user: CurrentUser, Path(id): Path<Uuid>) -> ApiResult<T>
where
    T: EditableContent,
    AppState: ContentState<T>,
{
    user.require(T::PERMISSIONS.view)?;

    let item = ContentState::<T>::content_store(&state)
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found::<T>(id))?;

    Ok(ApiResponse::success(item))
}

/// POST /api/admin/{kind} - 201 with the stored item
pub async fn create<T>(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<T::Input>,
) -> ApiResult<T>
where
    T: EditableContent,
    AppState: ContentState<T>,
{
    user.require(T::PERMISSIONS.create)?;

    let item = T::from_input(input, Utc::now()).map_err(ApiError::invalid_fields)?;
    let stored = ContentState::<T>::content_store(&state).insert(&item).await?;

    tracing::info!("{} created {} '{}'", user.email, T::KIND, stored.slug());
    Ok(ApiResponse::created(stored))
}

/// PUT /api/admin/{kind}/:id - Replace editable fields
pub async fn update<T>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<T::Input>,
) -> ApiResult<T>
where
    T: EditableContent,
    AppState: ContentState<T>,
{
    user.require(T::PERMISSIONS.edit)?;

    let store = ContentState::<T>::content_store(&state);
    let mut item = store.find_by_id(id).await?.ok_or_else(|| not_found::<T>(id))?;

    item.apply_input(input, Utc::now()).map_err(ApiError::invalid_fields)?;
    let stored = store.update(&item).await?;

    tracing::info!("{} updated {} '{}'", user.email, T::KIND, stored.slug());
    Ok(ApiResponse::success(stored))
}

/// DELETE /api/admin/{kind}/:id - 204
pub async fn delete<T>(State(state): State<AppState>, user: CurrentUser, Path(id): Path<Uuid>) -> ApiResult<()>
where
    T: EditableContent,
    AppState: ContentState<T>,
{
    user.require(T::PERMISSIONS.delete)?;

    if !ContentState::<T>::content_store(&state).delete(id).await? {
        return Err(not_found::<T>(id));
    }

    tracing::info!("{} deleted {} {}", user.email, T::KIND, id);
    Ok(ApiResponse::no_content())
}
