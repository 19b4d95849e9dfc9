// handlers/protected/session.rs - GET /api/auth/whoami handler

use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub user_type_id: Uuid,
    pub user_type: Option<String>,
    pub permissions: Vec<String>,
}

/// Current account and the permissions it holds right now
pub async fn whoami(State(state): State<AppState>, user: CurrentUser) -> ApiResult<WhoAmI> {
    let user_type = state
        .accounts
        .find_user_type(user.user_type_id)
        .await?
        .map(|t| t.name);

    Ok(ApiResponse::success(WhoAmI {
        id: user.id,
        name: user.name,
        email: user.email,
        user_type_id: user.user_type_id,
        user_type,
        permissions: user.permissions.to_sorted_vec(),
    }))
}
