// handlers/public/content.rs - Site-facing blog and case study reads
//
// One generic set of handlers serves both kinds; the router picks the kind
// with a turbofish (`list::<Blog>`).

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::app::{AppState, ContentState};
use crate::content::ContentRecord;
use crate::error::ApiError;
use crate::handlers::{ListQuery, Paginated};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/{blogs,case-studies} - Active items, newest first
pub async fn list<T>(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Paginated<T::Summary>>
where
    T: ContentRecord,
    AppState: ContentState<T>,
{
    let (filter, page, limit) = query.to_filter(&state.config.api, true);
    let result = ContentState::<T>::content_store(&state).list(&filter).await?;

    Ok(ApiResponse::success(Paginated::from_page(result, page, limit, |item: T| item.summary())))
}

/// GET /api/{blogs,case-studies}/:slug - One active item
pub async fn show<T>(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<T>
where
    T: ContentRecord,
    AppState: ContentState<T>,
{
    let item = ContentState::<T>::content_store(&state)
        .find_by_slug(&slug)
        .await?
        .filter(|item| item.is_active())
        .ok_or_else(|| ApiError::not_found(format!("No {} with slug '{}'", T::KIND.label(), slug)))?;

    Ok(ApiResponse::success(item))
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedQuery {
    /// Kept as text so a garbage value falls back to the default instead of
    /// rejecting the request
    pub limit: Option<String>,
}

/**
 * GET /api/related/{blogs,case-studies}/:id - Related content block
 *
 * Always 200. An unknown or malformed id, or a store failure, yields an
 * empty list so the page embedding the block still renders.
 *
 * ```json
 * { "success": true, "data": [ { "id": "...", "slug": "...", "title": "...", "tags": ["AI"] } ] }
 * ```
 */
pub async fn related<T>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RelatedQuery>,
) -> ApiResult<Vec<T::Summary>>
where
    T: ContentRecord,
    AppState: ContentState<T>,
{
    let limit = resolve_related_limit(
        query.limit.as_deref(),
        ContentState::<T>::default_related_limit(&state),
        state.config.content.max_related_limit,
    );

    let summaries = ContentState::<T>::related(&state).related(&id, limit).await;
    Ok(ApiResponse::success(summaries))
}

/// Missing, non-numeric or non-positive limits use the kind's default
fn resolve_related_limit(raw: Option<&str>, default: usize, max: usize) -> usize {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .map(|v| usize::try_from(v).unwrap_or(usize::MAX))
        .unwrap_or(default)
        .min(max)
}
